//! Language extractor trait definition.

use std::path::Path;

use codemap_core::{Edge, Node};

/// A diagnostic recorded when an extractor could not fully process a file.
/// Never raised upward — a parse failure degrades to partial output plus
/// one of these, and the driver logs it and moves on.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file_path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        ExtractionResult::default()
    }

    pub fn with_diagnostic(file_path: &str, message: impl Into<String>) -> Self {
        ExtractionResult {
            nodes: Vec::new(),
            edges: Vec::new(),
            diagnostics: vec![Diagnostic {
                file_path: file_path.to_string(),
                message: message.into(),
            }],
        }
    }
}

/// Common contract every per-language extractor implements: syntax tree in,
/// unresolved `(nodes, edges)` batch out. Never panics or returns `Err` for
/// a parseable-but-unexpected file shape — it degrades to a partial result
/// plus a diagnostic instead.
pub trait LanguageExtractor: Send + Sync {
    fn extract(&self, path: &Path, content: &[u8]) -> anyhow::Result<ExtractionResult>;
}

/// Collapse interior whitespace/newlines to single spaces and cap length —
/// used by every extractor to build a `Node::signature`.
pub fn normalize_signature(raw: &str, max_len: usize) -> String {
    let collapsed: String = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > max_len {
        collapsed.chars().take(max_len).collect()
    } else {
        collapsed
    }
}

pub const SIGNATURE_MAX_LEN: usize = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_signature_collapses_whitespace() {
        let raw = "fn   foo(\n    a: i32,\n    b: i32,\n) -> i32";
        assert_eq!(normalize_signature(raw, 200), "fn foo( a: i32, b: i32, ) -> i32");
    }

    #[test]
    fn normalize_signature_caps_length() {
        let raw = "a".repeat(300);
        assert_eq!(normalize_signature(&raw, 200).chars().count(), 200);
    }
}
