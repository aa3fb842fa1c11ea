use context_view::{parse, ContextConfig, ContextError, ContextView, Language};
use pretty_assertions::assert_eq;

const PYTHON_SOURCE: &str = r#"import os


class Greeter:
    def __init__(self, name):
        self.name = name

    def greet(self):
        print(f"hi {self.name}")


def main():
    g = Greeter("world")
    g.greet()


if __name__ == "__main__":
    main()
"#;

const RUST_SOURCE: &str = r#"use std::collections::HashMap;

pub struct Registry {
    entries: HashMap<String, u32>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: &str) {
        let next = self.entries.len() as u32;
        self.entries.insert(key.to_string(), next);
    }
}

fn main() {
    let mut registry = Registry::new();
    registry.insert("first");
}
"#;

#[test]
fn python_search_with_default_context() {
    let tree = parse(PYTHON_SOURCE, Language::Python).unwrap();
    let mut view = ContextView::new(PYTHON_SOURCE, &tree, ContextConfig::default()).unwrap();

    let hits = view.search("print", false).unwrap();
    assert_eq!(hits, vec![8]);

    view.add_lines_of_interest(&hits);
    view.add_context();
    let output = view.format();

    // The hit is marked, its enclosing class and method are visible, and
    // the unrelated main() body is elided behind a single marker.
    assert!(output.contains("█        print"), "output:\n{output}");
    assert!(output.contains("class Greeter"), "output:\n{output}");
    assert!(output.contains("def greet"), "output:\n{output}");
    assert!(!output.contains("def main"), "output:\n{output}");
    assert_eq!(output.matches("⋮...").count(), 1, "output:\n{output}");
}

#[test]
fn rust_search_shows_enclosing_impl_and_method() {
    let tree = parse(RUST_SOURCE, Language::Rust).unwrap();
    let mut view = ContextView::new(RUST_SOURCE, &tree, ContextConfig::default()).unwrap();

    let hits = view.search(r"entries\.insert", false).unwrap();
    assert_eq!(hits, vec![15]);

    view.add_lines_of_interest(&hits);
    view.add_context();
    let output = view.format();

    assert!(output.contains("impl Registry"), "output:\n{output}");
    assert!(output.contains("pub fn insert"), "output:\n{output}");
    assert!(output.contains("█"), "output:\n{output}");
    // Only the struct body stays elided: the clipped impl header reaches
    // line 15, the anchored tail starts at 19, and gap closing bridges
    // the single hidden line between them.
    assert!(!output.contains("entries: HashMap<String, u32>"), "output:\n{output}");
    assert_eq!(output.matches("⋮...").count(), 1, "output:\n{output}");
}

#[test]
fn last_physical_line_is_anchored() {
    let tree = parse(RUST_SOURCE, Language::Rust).unwrap();
    let mut view = ContextView::new(RUST_SOURCE, &tree, ContextConfig::default()).unwrap();

    let hits = view.search(r"entries\.insert", false).unwrap();
    view.add_lines_of_interest(&hits);
    view.add_context();

    let last_physical = view.num_lines() - 2;
    assert!(view.show_lines().contains(&last_physical));
}

#[test]
fn show_set_always_superset_of_lois() {
    let tree = parse(PYTHON_SOURCE, Language::Python).unwrap();

    for lois in [vec![0], vec![4, 12], vec![8, 13, 16]] {
        let mut view =
            ContextView::new(PYTHON_SOURCE, &tree, ContextConfig::default()).unwrap();
        view.add_lines_of_interest(&lois);
        view.add_context();

        for loi in &lois {
            assert!(view.show_lines().contains(loi), "loi {loi} missing");
        }
    }
}

#[test]
fn repeated_add_context_renders_identically() {
    let tree = parse(RUST_SOURCE, Language::Rust).unwrap();
    let mut view = ContextView::new(RUST_SOURCE, &tree, ContextConfig::default()).unwrap();

    let hits = view.search("HashMap", false).unwrap();
    view.add_lines_of_interest(&hits);

    view.add_context();
    let first = view.format();
    view.add_context();

    assert_eq!(view.format(), first);
}

#[test]
fn empty_loi_set_renders_nothing() {
    let tree = parse(PYTHON_SOURCE, Language::Python).unwrap();
    let mut view = ContextView::new(PYTHON_SOURCE, &tree, ContextConfig::for_terminal()).unwrap();
    view.add_context();

    assert_eq!(view.format(), "");
}

#[test]
fn from_source_detects_language() {
    let mut view =
        ContextView::from_source(PYTHON_SOURCE, "greeter.py", ContextConfig::default()).unwrap();
    let hits = view.search("greet", true).unwrap();
    assert!(!hits.is_empty());
}

#[test]
fn from_source_rejects_unknown_extension() {
    let result = ContextView::from_source("plain text", "notes.txt", ContextConfig::default());
    assert!(matches!(
        result,
        Err(ContextError::UnsupportedLanguage(_))
    ));
}
