use crate::error::{ContextError, Result};
use crate::language::Language;
use tree_sitter::{Node, Parser};

/// A concrete-syntax-tree node reduced to its line span.
///
/// This is the collaborator contract of the extractor: any provider that
/// can produce `{start_line, end_line, children}` with strictly nested or
/// disjoint spans can feed a [`crate::ContextView`]. Lines are 0-indexed
/// and `end_line` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub start_line: usize,
    pub end_line: usize,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a leaf node covering `[start_line, end_line]`
    #[must_use]
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
            children: Vec::new(),
        }
    }

    /// Create a node with children
    #[must_use]
    pub fn with_children(start_line: usize, end_line: usize, children: Vec<SyntaxNode>) -> Self {
        Self {
            start_line,
            end_line,
            children,
        }
    }

    /// Number of line breaks the node spans (0 for a single-line node)
    #[must_use]
    pub fn span_lines(&self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }
}

/// Parse source text into a span tree using the language's Tree-sitter grammar.
///
/// This is the only point where parsing can fail; everything downstream is
/// total. A failure here means the file cannot be shown with structural
/// context and the caller should fall back to a plain content view.
pub fn parse(content: &str, language: Language) -> Result<SyntaxNode> {
    let ts_language = language.tree_sitter_language()?;
    let mut parser = Parser::new();
    parser
        .set_language(&ts_language)
        .map_err(|e| ContextError::tree_sitter(format!("Failed to set language: {e}")))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| ContextError::parse("Failed to parse source code"))?;

    Ok(convert(tree.root_node()))
}

/// Reduce a Tree-sitter node to its line span, recursively
fn convert(node: Node) -> SyntaxNode {
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).map(convert).collect();

    SyntaxNode {
        start_line: node.start_position().row,
        end_line: node.end_position().row,
        children,
    }
}
