use crate::tree::SyntaxNode;
use std::collections::BTreeSet;

/// Index of a node in the flattened arena
pub type NodeId = usize;

/// Line span of an indexed node, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpan {
    pub start_line: usize,
    pub end_line: usize,
}

impl NodeSpan {
    /// Number of line breaks the span covers
    #[must_use]
    pub fn size(self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }
}

/// One multi-line node beginning at a scope-start line.
///
/// Ordering is derived field by field, so min-selection picks the smallest
/// span first and breaks ties on the smallest start, then the smallest end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct HeaderCandidate {
    span_lines: usize,
    start: usize,
    end: usize,
}

struct ArenaNode {
    span: NodeSpan,
    children: Vec<NodeId>,
}

/// Per-line structural index built in one depth-first walk of the syntax tree.
///
/// Read-only after construction; one index serves any number of
/// context/render calls against different lines of interest.
pub struct ScopeIndex {
    num_lines: usize,
    /// line -> scope-start lines whose span covers it
    scopes: Vec<BTreeSet<usize>>,
    /// line -> resolved header range, half-open `[head_start, head_end)`
    headers: Vec<(usize, usize)>,
    /// line -> arena ids of nodes starting there
    nodes_at_line: Vec<Vec<NodeId>>,
    arena: Vec<ArenaNode>,
}

impl ScopeIndex {
    /// Build the index for a tree over `num_lines` line slots
    /// (physical lines plus the virtual trailing anchor).
    #[must_use]
    pub fn build(root: &SyntaxNode, num_lines: usize, header_max: usize) -> Self {
        let mut index = Self {
            num_lines,
            scopes: vec![BTreeSet::new(); num_lines],
            headers: Vec::new(),
            nodes_at_line: vec![Vec::new(); num_lines],
            arena: Vec::new(),
        };

        let mut candidates: Vec<Vec<HeaderCandidate>> = vec![Vec::new(); num_lines];
        index.walk(root, &mut candidates);
        index.headers = resolve_headers(&candidates, header_max);
        index
    }

    fn walk(&mut self, node: &SyntaxNode, candidates: &mut [Vec<HeaderCandidate>]) -> NodeId {
        let start = node.start_line;
        let end = node.end_line.max(start);

        let id = self.arena.len();
        self.arena.push(ArenaNode {
            span: NodeSpan {
                start_line: start,
                end_line: end,
            },
            children: Vec::new(),
        });

        // Spans past the line store are clipped, never fatal.
        if start < self.num_lines {
            self.nodes_at_line[start].push(id);

            if end > start {
                candidates[start].push(HeaderCandidate {
                    span_lines: end - start,
                    start,
                    end,
                });
            }

            for line in start..=end.min(self.num_lines - 1) {
                self.scopes[line].insert(start);
            }
        }

        for child in &node.children {
            let child_id = self.walk(child, candidates);
            self.arena[id].children.push(child_id);
        }

        id
    }

    /// Total line slots covered by the index
    #[must_use]
    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    /// Scope-start lines whose span covers `line`
    #[must_use]
    pub fn scopes_at(&self, line: usize) -> Option<&BTreeSet<usize>> {
        self.scopes.get(line)
    }

    /// Resolved header range for `line`, half-open.
    ///
    /// Falls back to the line standing for itself when out of range.
    #[must_use]
    pub fn header(&self, line: usize) -> (usize, usize) {
        self.headers
            .get(line)
            .copied()
            .unwrap_or((line, line + 1))
    }

    /// Arena ids of nodes whose span starts at `line`
    #[must_use]
    pub fn nodes_at(&self, line: usize) -> &[NodeId] {
        self.nodes_at_line
            .get(line)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Span of an indexed node
    #[must_use]
    pub fn node_span(&self, id: NodeId) -> NodeSpan {
        self.arena[id].span
    }

    /// Last line covered by any node starting at `line`
    #[must_use]
    pub fn last_line_of_scope(&self, line: usize) -> Option<usize> {
        self.nodes_at(line)
            .iter()
            .map(|&id| self.arena[id].span.end_line)
            .max()
    }

    /// Spans of every node starting at `line` plus all their transitive
    /// children, in depth-first order
    #[must_use]
    pub fn descendants(&self, line: usize) -> Vec<NodeSpan> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes_at(line).to_vec();

        while let Some(id) = stack.pop() {
            let node = &self.arena[id];
            out.push(node.span);
            stack.extend(node.children.iter().copied());
        }

        out
    }
}

/// Resolve header candidates to one `(head_start, head_end)` per line.
///
/// The smallest candidate wins; its end line is shown inclusively unless
/// the natural span exceeds `header_max`, in which case the header is
/// clipped to `header_max` lines. Lines with no multi-line construct
/// starting there stand for themselves.
fn resolve_headers(candidates: &[Vec<HeaderCandidate>], header_max: usize) -> Vec<(usize, usize)> {
    candidates
        .iter()
        .enumerate()
        .map(|(line, cands)| match cands.iter().min() {
            Some(best) => {
                let head_end = if best.span_lines > header_max {
                    best.start + header_max
                } else {
                    best.end + 1
                };
                (best.start, head_end)
            }
            None => (line, line + 1),
        })
        .collect()
}
