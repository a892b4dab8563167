//! C extractor — thin wrapper over the shared C-family extraction logic in
//! [`super::clike`].

use std::path::Path;

use anyhow::Result;
use codemap_core::Language;

use super::clike;
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParserPool};

pub struct CExtractor {
    parser_pool: ParserPool,
}

impl CExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for CExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        clike::extract(&self.parser_pool, path, content, FileType::C, Language::C)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::NodeKind;

    #[test]
    fn extracts_struct_and_function() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = CExtractor::new(pool);
        let code = r#"
struct Point {
    int x;
    int y;
};

int add(int a, int b) {
    return a + b;
}
"#;
        let result = extractor.extract(Path::new("geometry.c"), code.as_bytes()).unwrap();
        assert!(result.nodes.iter().any(|n| n.name == "Point" && n.kind == NodeKind::Struct));
        assert!(result.nodes.iter().any(|n| n.name == "add" && n.kind == NodeKind::Function));
    }
}
