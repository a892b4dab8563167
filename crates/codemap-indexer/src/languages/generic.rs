//! Fallback extractor for extensions with no dedicated grammar (Ruby, PHP,
//! ...). There is no tree-sitter grammar wired in for these, and parsing
//! their content with an unrelated grammar would produce meaningless nodes,
//! so this extractor never feeds a parser. It still attempts real
//! extraction, though: a line-oriented regex pass over the keywords common
//! to these languages' function/class-like declarations (`class`,
//! `module`, `def`, `function`), matching by declaration shape rather than
//! grammar node type. This is strictly weaker than a real parse — no
//! nesting, no heritage, no docstrings — so every file through here still
//! gets a diagnostic noting it was indexed heuristically, not structurally.

use std::path::Path;

use anyhow::Result;
use codemap_core::{Edge, EdgeKind, Language, Node, NodeId, NodeKind, Visibility};
use regex::Regex;

use super::{Diagnostic, ExtractionResult, LanguageExtractor};
use crate::parser_pool::ParserPool;

pub struct GenericExtractor {
    #[allow(dead_code)]
    parser_pool: ParserPool,
}

impl GenericExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

/// One keyword pattern plus the node kind it implies. Covers Ruby
/// (`class`/`module`/`def`) and PHP (`class`/`interface`/`trait`/`function`)
/// without needing to know which of the two a given file is.
fn declaration_patterns() -> Vec<(Regex, NodeKind)> {
    vec![
        (Regex::new(r"^\s*(?:public\s+|private\s+|abstract\s+|final\s+)*class\s+(\w+)").unwrap(), NodeKind::Class),
        (Regex::new(r"^\s*module\s+(\w+)").unwrap(), NodeKind::Module),
        (Regex::new(r"^\s*(?:public\s+)?interface\s+(\w+)").unwrap(), NodeKind::Interface),
        (Regex::new(r"^\s*trait\s+(\w+)").unwrap(), NodeKind::Trait),
        (Regex::new(r"^\s*def\s+([\w.!?=\[\]<>+*/%-]+)").unwrap(), NodeKind::Function),
        (Regex::new(r"^\s*(?:public\s+|private\s+|protected\s+|static\s+)*function\s+&?(\w+)\s*\(").unwrap(), NodeKind::Function),
    ]
}

impl LanguageExtractor for GenericExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        let path_str = super::path_to_str(path);
        let text = String::from_utf8_lossy(content);
        let line_count = content.iter().filter(|&&b| b == b'\n').count() as u32 + 1;

        let module_id = NodeId::new(&path_str, super::MODULE_QUALIFIED_NAME);
        let mut nodes = vec![Node {
            id: module_id,
            name: super::module_name_from_path(path),
            qualified_name: super::MODULE_QUALIFIED_NAME.to_string(),
            kind: NodeKind::Module,
            file_path: path_str.clone(),
            start_line: 1,
            end_line: line_count,
            signature: String::new(),
            docstring: String::new(),
            decorators: Vec::new(),
            visibility: Visibility::Public,
            language: Some(Language::Other),
        }];
        let mut edges = Vec::new();

        let patterns = declaration_patterns();
        for (line_no, line) in text.lines().enumerate() {
            let Some((name, kind)) = patterns.iter().find_map(|(re, kind)| {
                re.captures(line).and_then(|c| c.get(1)).map(|m| (m.as_str().to_string(), *kind))
            }) else {
                continue;
            };
            let start = (line_no + 1) as u32;
            let id = NodeId::new(&path_str, &name);
            nodes.push(Node {
                id,
                name: name.clone(),
                qualified_name: name,
                kind,
                file_path: path_str.clone(),
                start_line: start,
                end_line: start,
                signature: line.trim().to_string(),
                docstring: String::new(),
                decorators: Vec::new(),
                visibility: Visibility::Public,
                language: Some(Language::Other),
            });
            edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));
        }

        Ok(ExtractionResult {
            nodes,
            edges,
            diagnostics: vec![Diagnostic {
                file_path: path_str,
                message: "no structural extractor for this file type; indexed heuristically by keyword"
                    .to_string(),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_a_bare_module_node_when_nothing_matches() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = GenericExtractor::new(pool);
        let result = extractor.extract(Path::new("data.txt"), b"just some text\n").unwrap();

        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.nodes[0].kind, NodeKind::Module);
        assert!(result.edges.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn extracts_ruby_class_and_method_by_keyword() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = GenericExtractor::new(pool);
        let code = "class Greeter\n  def hello\n    puts \"hi\"\n  end\nend\n";
        let result = extractor.extract(Path::new("greeter.rb"), code.as_bytes()).unwrap();

        assert!(result.nodes.iter().any(|n| n.name == "Greeter" && n.kind == NodeKind::Class));
        assert!(result.nodes.iter().any(|n| n.name == "hello" && n.kind == NodeKind::Function));
        assert!(result.edges.iter().all(|e| e.relation == EdgeKind::Defines));
    }

    #[test]
    fn extracts_php_class_and_function_by_keyword() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = GenericExtractor::new(pool);
        let code = "<?php\nclass Greeter {\n  public function hello() {\n    echo \"hi\";\n  }\n}\n";
        let result = extractor.extract(Path::new("Greeter.php"), code.as_bytes()).unwrap();

        assert!(result.nodes.iter().any(|n| n.name == "Greeter" && n.kind == NodeKind::Class));
        assert!(result.nodes.iter().any(|n| n.name == "hello" && n.kind == NodeKind::Function));
    }
}
