//! Helpers shared by the per-language extractors.

use codemap_core::Visibility;
use tree_sitter::{Node, Point};

use crate::extractor::{normalize_signature, SIGNATURE_MAX_LEN};

pub fn point_to_line(point: Point) -> u32 {
    (point.row as u32) + 1
}

pub fn node_line_range(node: Node) -> (u32, u32) {
    (point_to_line(node.start_position()), point_to_line(node.end_position()))
}

pub fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

pub fn signature_from_node(node: Node, source: &[u8]) -> String {
    normalize_signature(node_text(node, source), SIGNATURE_MAX_LEN)
}

/// `private` for a leading-underscore identifier, `public` otherwise. Used
/// by the Python extractor.
pub fn visibility_from_leading_underscore(name: &str) -> Visibility {
    if name.starts_with('_') {
        Visibility::Private
    } else {
        Visibility::Public
    }
}

/// `public` when the identifier starts with an uppercase letter, `private`
/// otherwise. Used by the Go extractor.
pub fn visibility_from_leading_case(name: &str) -> Visibility {
    match name.chars().next() {
        Some(c) if c.is_uppercase() => Visibility::Public,
        _ => Visibility::Private,
    }
}

/// Walk backward over a node's preceding siblings, collecting a contiguous
/// run of `comment`-kind nodes immediately above it, and return their text
/// joined and trimmed. Used by C-like/Rust/Go/Java extractors whose
/// "docstring" is really a leading comment block.
pub fn leading_comment_block(node: Node, source: &[u8]) -> String {
    let mut lines = Vec::new();
    let mut current = node.prev_sibling();
    while let Some(sibling) = current {
        if sibling.kind() == "comment" || sibling.kind() == "line_comment" || sibling.kind() == "block_comment" {
            lines.push(strip_comment_markers(node_text(sibling, source)));
            current = sibling.prev_sibling();
        } else {
            break;
        }
    }
    lines.reverse();
    lines.join("\n").trim().to_string()
}

fn strip_comment_markers(raw: &str) -> String {
    raw.trim()
        .trim_start_matches("///")
        .trim_start_matches("//!")
        .trim_start_matches("//")
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_end_matches("*/")
        .trim_start_matches('*')
        .trim()
        .to_string()
}

/// Leading string-literal docstring of a Python/JS class or function body:
/// the first statement of the block, if it is a bare string expression.
pub fn leading_string_docstring(body: Node, source: &[u8]) -> String {
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        match child.kind() {
            "expression_statement" => {
                let mut inner = child.walk();
                if let Some(string_node) = child.children(&mut inner).find(|c| c.kind() == "string") {
                    return node_text(string_node, source)
                        .trim_matches(|c| c == '"' || c == '\'')
                        .trim_start_matches("\"\"\"")
                        .trim_end_matches("\"\"\"")
                        .trim()
                        .to_string();
                }
                return String::new();
            }
            "comment" => continue,
            _ => return String::new(),
        }
    }
    String::new()
}
