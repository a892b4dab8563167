//! TypeScript extractor — thin wrapper over the shared JS/TS extraction
//! logic in [`super::jsts`], which also covers TypeScript's `interface`
//! declarations since the TS grammar is a superset of the JS one.

use std::path::Path;

use anyhow::Result;
use codemap_core::Language;

use super::jsts;
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParserPool};

pub struct TypeScriptExtractor {
    parser_pool: ParserPool,
}

impl TypeScriptExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for TypeScriptExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        jsts::extract(&self.parser_pool, path, content, FileType::TypeScript, Language::TypeScript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::{EdgeKind, NodeKind, Visibility};

    #[test]
    fn extracts_interface_and_implements_clause() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = TypeScriptExtractor::new(pool);
        let code = r#"
export interface Shape {
    area(): number;
}

export class Circle implements Shape {
    area() {
        return 0;
    }
}
"#;
        let result = extractor.extract(Path::new("test.ts"), code.as_bytes()).unwrap();

        let shape = result.nodes.iter().find(|n| n.name == "Shape").unwrap();
        assert_eq!(shape.kind, NodeKind::Interface);
        assert_eq!(shape.visibility, Visibility::Exported);

        let circle = result.nodes.iter().find(|n| n.name == "Circle").unwrap();
        assert!(result
            .edges
            .iter()
            .any(|e| e.from_id == circle.id && e.relation == EdgeKind::Implements));
    }
}
