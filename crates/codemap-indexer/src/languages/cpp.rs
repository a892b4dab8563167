//! C++ extractor — thin wrapper over the shared C-family extraction logic in
//! [`super::clike`], which also handles classes, base clauses, and methods.

use std::path::Path;

use anyhow::Result;
use codemap_core::Language;

use super::clike;
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParserPool};

pub struct CppExtractor {
    parser_pool: ParserPool,
}

impl CppExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for CppExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        clike::extract(&self.parser_pool, path, content, FileType::Cpp, Language::Cpp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::{EdgeKind, NodeKind};

    #[test]
    fn extracts_class_with_base_and_method() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = CppExtractor::new(pool);
        let code = r#"
class Animal {
public:
    void speak();
};

class Dog : public Animal {
public:
    void speak() {}
};
"#;
        let result = extractor.extract(Path::new("animal.cpp"), code.as_bytes()).unwrap();
        let dog = result.nodes.iter().find(|n| n.name == "Dog" && n.kind == NodeKind::Class).unwrap();
        assert!(result.edges.iter().any(|e| e.from_id == dog.id && e.relation == EdgeKind::Inherits));
        assert!(result.nodes.iter().any(|n| n.qualified_name == "Dog.speak"));
    }
}
