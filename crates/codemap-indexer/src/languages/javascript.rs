//! JavaScript extractor — thin wrapper over the shared JS/TS extraction
//! logic in [`super::jsts`].

use std::path::Path;

use anyhow::Result;
use codemap_core::Language;

use super::jsts;
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParserPool};

pub struct JavaScriptExtractor {
    parser_pool: ParserPool,
}

impl JavaScriptExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for JavaScriptExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        jsts::extract(&self.parser_pool, path, content, FileType::JavaScript, Language::JavaScript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::{EdgeKind, NodeKind};

    #[test]
    fn extracts_class_function_and_heritage() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = JavaScriptExtractor::new(pool);
        let code = r#"
class Animal {
    speak() {}
}

export class Dog extends Animal {
    speak() {}
}

function createUser(name) {
    return name;
}

const arrowFunc = (x, y) => x + y;
"#;
        let result = extractor.extract(Path::new("test.js"), code.as_bytes()).unwrap();

        let dog = result.nodes.iter().find(|n| n.name == "Dog").unwrap();
        assert_eq!(dog.kind, NodeKind::Class);
        assert!(result
            .edges
            .iter()
            .any(|e| e.from_id == dog.id && e.relation == EdgeKind::Inherits));

        assert!(result.nodes.iter().any(|n| n.name == "createUser" && n.kind == NodeKind::Function));
        assert!(result.nodes.iter().any(|n| n.name == "arrowFunc"));
    }
}
