//! # Context View
//!
//! Structural source views: given a file and a set of lines of interest
//! (search hits, ranked symbol locations), compute the minimal readable
//! subset of lines to display, expand it with enclosing- and child-scope
//! context under a size budget, and render it with elision markers for
//! the omitted regions.
//!
//! ## Architecture
//!
//! ```text
//! Source Code + Syntax Tree
//!     │
//!     ├──> Scope Indexing (one tree walk)
//!     │    ├─> per-line covering scopes
//!     │    ├─> resolved collapsed-scope headers
//!     │    └─> nodes starting per line
//!     │
//!     ├──> Context Building (per LOI set)
//!     │    ├─> seed + padding
//!     │    ├─> last-line anchoring
//!     │    ├─> ancestor-scope headers
//!     │    ├─> budgeted child-scope summary
//!     │    └─> margin + gap closing
//!     │
//!     └──> Rendering
//!          └─> shown lines, LOI marks, one marker per hidden run
//! ```
//!
//! Indexing happens once per file; context building and rendering are
//! cheap, deterministic, and recomputed from scratch per call.
//!
//! ## Example
//!
//! ```rust
//! use context_view::{ContextConfig, ContextView, Language, parse};
//!
//! let source = "fn main() {\n    let x = 1;\n    println!(\"{x}\");\n}\n";
//! let tree = parse(source, Language::Rust).unwrap();
//!
//! let mut view = ContextView::new(source, &tree, ContextConfig::default()).unwrap();
//! let hits = view.search("println", false).unwrap();
//! view.add_lines_of_interest(&hits);
//! view.add_context();
//! print!("{}", view.format());
//! ```

mod config;
mod error;
mod index;
mod language;
mod tree;
mod view;

pub use config::ContextConfig;
pub use error::{ContextError, Result};
pub use language::Language;
pub use tree::{parse, SyntaxNode};
pub use view::ContextView;
