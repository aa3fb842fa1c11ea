use crate::config::ContextConfig;
use crate::error::{ContextError, Result};
use crate::index::ScopeIndex;
use crate::language::Language;
use crate::tree::{parse, SyntaxNode};
use console::Style;
use regex::RegexBuilder;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Rendered in place of one or more contiguous hidden lines
const ELISION_MARKER: &str = "⋮...";
/// Line prefix for a line of interest
const LOI_MARKER: &str = "█";
/// Line prefix for supporting context
const CONTEXT_MARKER: &str = "│";

/// Scopes smaller than this are shown whole; summarizing them would add
/// elision noise for no savings
const CHILD_WHOLE_SCOPE_LIMIT: usize = 5;
/// Bounds on the child-context expansion budget
const CHILD_BUDGET_MIN: usize = 5;
const CHILD_BUDGET_MAX: usize = 25;
const CHILD_BUDGET_FRACTION: f64 = 0.10;

/// Structural view of one source file.
///
/// Binds the file's lines and syntax tree once, then computes which lines
/// to display for a given set of lines of interest (LOIs): the LOIs
/// themselves, padding, enclosing-scope headers, budgeted child scopes,
/// a leading margin, and gap closing. [`ContextView::format`] renders the
/// result with a single elision marker per hidden run.
///
/// The view is re-entrant across calls: the indexed structures are
/// read-only after construction and the show set is recomputed from
/// scratch on every [`ContextView::add_context`] call.
pub struct ContextView {
    config: ContextConfig,
    lines: Vec<String>,
    /// Physical line count plus one virtual trailing slot used as a
    /// stable anchor past end-of-file
    num_lines: usize,
    index: ScopeIndex,
    lois: BTreeSet<usize>,
    show: BTreeSet<usize>,
    /// Highlighted copies of matched lines, preferred by the renderer
    highlighted: HashMap<usize, String>,
}

impl ContextView {
    /// Bind source text and its syntax tree.
    ///
    /// The tree is consumed here and not referenced afterwards; any
    /// provider producing well-nested [`SyntaxNode`] spans works.
    pub fn new(source: &str, tree: &SyntaxNode, config: ContextConfig) -> Result<Self> {
        config.validate()?;

        let lines: Vec<String> = source.lines().map(str::to_owned).collect();
        let num_lines = lines.len() + 1;
        let index = ScopeIndex::build(tree, num_lines, config.header_max);

        Ok(Self {
            config,
            lines,
            num_lines,
            index,
            lois: BTreeSet::new(),
            show: BTreeSet::new(),
            highlighted: HashMap::new(),
        })
    }

    /// Detect the language from `path`, parse `source` with Tree-sitter,
    /// and bind.
    ///
    /// Fails fast when no grammar is available; the caller should fall
    /// back to a plain content view in that case.
    pub fn from_source(source: &str, path: impl AsRef<Path>, config: ContextConfig) -> Result<Self> {
        let path = path.as_ref();
        let language = Language::from_path(path);
        if !language.supports_ast() {
            return Err(ContextError::unsupported_language(
                path.display().to_string(),
            ));
        }

        let tree = parse(source, language)?;
        Self::new(source, &tree, config)
    }

    /// Add lines of interest. Out-of-range indices are ignored.
    pub fn add_lines_of_interest(&mut self, lines: &[usize]) {
        let limit = self.num_lines;
        self.lois.extend(lines.iter().copied().filter(|&l| l < limit));
    }

    /// Drop all lines of interest (and thereby the computed show set on
    /// the next [`ContextView::add_context`] call)
    pub fn clear_lines_of_interest(&mut self) {
        self.lois.clear();
    }

    /// Lines of interest currently registered
    #[must_use]
    pub fn lines_of_interest(&self) -> &BTreeSet<usize> {
        &self.lois
    }

    /// Line indices selected for display by the last
    /// [`ContextView::add_context`] call
    #[must_use]
    pub fn show_lines(&self) -> &BTreeSet<usize> {
        &self.show
    }

    /// Line slots covered, including the virtual trailing anchor
    #[must_use]
    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    /// Scan lines for a regex pattern, returning matching line indices.
    ///
    /// When color is enabled, highlighted copies of matched lines are
    /// recorded and preferred by [`ContextView::format`]. Each call
    /// replaces the previous search's highlights.
    pub fn search(&mut self, pattern: &str, ignore_case: bool) -> Result<Vec<usize>> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()?;
        self.highlighted.clear();
        let style = match_style();

        let mut found = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if !re.is_match(line) {
                continue;
            }
            found.push(i);

            if self.config.color {
                let highlighted = re.replace_all(line, |caps: &regex::Captures<'_>| {
                    style.apply_to(&caps[0]).to_string()
                });
                self.highlighted.insert(i, highlighted.into_owned());
            }
        }

        if self.config.verbose {
            log::debug!("search matched {} lines", found.len());
        }
        Ok(found)
    }

    /// Grow the show set around the registered lines of interest.
    ///
    /// Recomputes from scratch: repeated calls with the same lines of
    /// interest produce the same show set. With no lines of interest the
    /// show set stays empty.
    pub fn add_context(&mut self) {
        self.show.clear();
        if self.lois.is_empty() {
            return;
        }

        let lois: Vec<usize> = self.lois.iter().copied().collect();
        let mut visited = vec![false; self.num_lines];
        let mut unbounded = usize::MAX;

        self.show.extend(lois.iter().copied());

        if self.config.loi_pad > 0 {
            let pad = self.config.loi_pad;
            for &loi in &lois {
                let lo = loi.saturating_sub(pad);
                let hi = (loi + pad).min(self.num_lines - 1);
                self.show.extend(lo..=hi);
            }
        }

        if self.config.last_line && self.num_lines >= 2 {
            let bottom = self.num_lines - 2;
            self.show.insert(bottom);
            self.add_ancestor_scopes(bottom, &mut visited, &mut unbounded);
        }

        if self.config.parent_context {
            for &loi in &lois {
                self.add_ancestor_scopes(loi, &mut visited, &mut unbounded);
            }
        }
        if self.config.verbose {
            log::debug!("after ancestor expansion: {} lines shown", self.show.len());
        }

        if self.config.child_context {
            for &loi in &lois {
                self.add_child_context(loi, &mut visited);
            }
        }
        if self.config.verbose {
            log::debug!("after child expansion: {} lines shown", self.show.len());
        }

        if self.config.margin > 0 {
            self.show.extend(0..self.config.margin.min(self.num_lines));
        }

        self.close_small_gaps();
    }

    /// Show the resolved headers of every scope covering `line`, walking
    /// the ancestor chain of each scope's end line when last-line
    /// anchoring is on.
    ///
    /// `budget` is the number of lines this call may still add; expansion
    /// stops inserting once it reaches zero. Ancestor passes run
    /// unbounded, child-context passes share one budget.
    fn add_ancestor_scopes(&mut self, line: usize, visited: &mut [bool], budget: &mut usize) {
        if line >= self.num_lines || visited[line] {
            return;
        }
        visited[line] = true;

        let scope_starts: Vec<usize> = match self.index.scopes_at(line) {
            Some(scopes) => scopes.iter().copied().collect(),
            None => return,
        };

        for scope_start in scope_starts {
            let (head_start, head_end) = self.index.header(scope_start);

            // A top-of-file scope header is noise for most files; skip it
            // unless asked for, but keep walking the chain below.
            if head_start > 0 || self.config.show_top_of_file_parent_scope {
                for l in head_start..head_end.min(self.num_lines) {
                    if *budget == 0 {
                        return;
                    }
                    if self.show.insert(l) {
                        *budget -= 1;
                    }
                }
            }

            if self.config.last_line {
                if let Some(last) = self.index.last_line_of_scope(scope_start) {
                    self.add_ancestor_scopes(last, visited, budget);
                }
            }
        }
    }

    /// Summarize the scope starting at `line`: small scopes are shown
    /// whole; larger ones surface their biggest sub-scopes first, under a
    /// budget proportional to the scope size.
    fn add_child_context(&mut self, line: usize, visited: &mut [bool]) {
        if self.index.nodes_at(line).is_empty() {
            return;
        }
        let Some(last_line) = self.index.last_line_of_scope(line) else {
            return;
        };
        let size = last_line.saturating_sub(line);

        if size < CHILD_WHOLE_SCOPE_LIMIT {
            for l in line..=last_line.min(self.num_lines - 1) {
                self.show.insert(l);
            }
            return;
        }

        let mut children = self.index.descendants(line);
        children.sort_by(|a, b| {
            b.size()
                .cmp(&a.size())
                .then_with(|| a.start_line.cmp(&b.start_line))
        });

        let mut budget = ((size as f64 * CHILD_BUDGET_FRACTION) as usize)
            .clamp(CHILD_BUDGET_MIN, CHILD_BUDGET_MAX);
        for child in children {
            if budget == 0 {
                break;
            }
            self.add_ancestor_scopes(child.start_line, visited, &mut budget);
        }
    }

    /// Close single-line holes between shown lines and absorb one blank
    /// line trailing a shown, non-blank line. Gaps of two or more hidden
    /// lines stay elided.
    ///
    /// An absorbed blank can narrow a two-line gap into a single hole, so
    /// the sub-steps repeat until the show set stops growing. The result
    /// is a fixpoint: re-running the pass changes nothing.
    fn close_small_gaps(&mut self) {
        loop {
            let sorted: Vec<usize> = self.show.iter().copied().collect();
            let mut closed = std::mem::take(&mut self.show);

            for pair in sorted.windows(2) {
                if pair[1] - pair[0] == 2 {
                    closed.insert(pair[0] + 1);
                }
            }

            for i in 0..self.lines.len() {
                if !closed.contains(&i) || self.lines[i].trim().is_empty() {
                    continue;
                }
                if i + 2 < self.num_lines && self.lines[i + 1].trim().is_empty() {
                    closed.insert(i + 1);
                }
            }

            let grown = closed.len() > sorted.len();
            self.show = closed;
            if !grown {
                break;
            }
        }
    }

    /// Render the show set: shown lines with LOI/context prefixes and one
    /// elision marker per contiguous hidden run.
    #[must_use]
    pub fn format(&self) -> String {
        if self.show.is_empty() {
            return String::new();
        }

        let style = match_style();
        let mut output = String::new();
        let mut eliding = !self.show.contains(&0);

        for (i, line) in self.lines.iter().enumerate() {
            if !self.show.contains(&i) {
                if !eliding {
                    output.push_str(ELISION_MARKER);
                    output.push('\n');
                    eliding = true;
                }
                continue;
            }
            eliding = false;

            if self.config.line_number {
                output.push_str(&format!("{:3}", i + 1));
            }

            if self.config.mark_lois && self.lois.contains(&i) {
                if self.config.color {
                    output.push_str(&style.apply_to(LOI_MARKER).to_string());
                } else {
                    output.push_str(LOI_MARKER);
                }
            } else {
                output.push_str(CONTEXT_MARKER);
            }

            match self.highlighted.get(&i) {
                Some(highlighted) => output.push_str(highlighted),
                None => output.push_str(line),
            }
            output.push('\n');
        }

        output
    }
}

/// Styling for matches and LOI markers; forced so output does not depend
/// on whether stdout is a terminal
fn match_style() -> Style {
    Style::new().red().bold().force_styling(true)
}
