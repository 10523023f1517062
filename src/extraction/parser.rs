//! Tree-sitter parser integration for Python
//!
//! Tree-sitter recovers from syntax errors instead of failing, so a tree that
//! contains ERROR or MISSING nodes is reported as a parse failure here.

use crate::core::errors::{Error, Result};
use std::path::Path;
use tree_sitter::{Language, Node, Parser, Tree};

/// Parse Python source into a tree-sitter tree, rejecting malformed input.
pub fn parse_python(content: &str, path: &Path) -> Result<Tree> {
    let mut parser = Parser::new();
    let language: Language = tree_sitter_python::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| Error::parse(path, 0, format!("failed to load Python grammar: {e}")))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| Error::parse(path, 0, "parser produced no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(Error::parse(path, line, "invalid Python syntax"));
    }

    Ok(tree)
}

/// Line (1-indexed) of the first ERROR or MISSING node in document order
pub fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node_line(&node));
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error_line)
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Get the line number for a tree-sitter node (1-indexed)
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Named children of a node, collected so callers can iterate freely
pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}
