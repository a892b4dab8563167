//! Per-language structural extractors and the extension-keyed dispatch table.
//!
//! Every extractor implements [`crate::extractor::LanguageExtractor`] and is
//! looked up by file extension through [`get_extractor`]. Shared parsing
//! helpers live in [`common`]; the C-family and JS/TS-family each share one
//! tree-walking implementation (`clike`, `jsts`) behind thin per-extension
//! wrappers, since the grammars differ only in a handful of node names.

pub mod c;
pub mod clike;
pub mod common;
pub mod cpp;
pub mod csharp;
pub mod generic;
pub mod go;
pub mod java;
pub mod javascript;
pub mod jsts;
pub mod python;
pub mod rust;
pub mod typescript;

use std::path::Path;

pub use crate::extractor::{Diagnostic, ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParserPool};

/// Qualified name assigned to the synthetic module node every extractor
/// emits as the root of its file's `defines` tree.
pub const MODULE_QUALIFIED_NAME: &str = "<module>";

/// Project-relative, forward-slash path, used as extractor input and as
/// the hashing key for [`codemap_core::NodeId`].
pub fn path_to_str(path: &Path) -> String {
    codemap_core::model::normalize_path(path)
}

/// File-stem-derived name for a file's module node (`src/foo/bar.py` -> `bar`).
pub fn module_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module")
        .to_string()
}

/// Look up the extractor for a file by extension. `None` for a path whose
/// extension is not recognised at all; a recognised extension with no
/// dedicated extractor still gets the [`generic`] fallback.
pub fn get_extractor(path: &Path, parser_pool: &ParserPool) -> Option<Box<dyn LanguageExtractor>> {
    let file_type = FileType::from_path(&path.to_path_buf())?;
    Some(match file_type {
        FileType::Rust => Box::new(rust::RustExtractor::new(parser_pool.clone())),
        FileType::Python => Box::new(python::PythonExtractor::new(parser_pool.clone())),
        FileType::JavaScript => Box::new(javascript::JavaScriptExtractor::new(parser_pool.clone())),
        FileType::TypeScript => Box::new(typescript::TypeScriptExtractor::new(parser_pool.clone())),
        FileType::Go => Box::new(go::GoExtractor::new(parser_pool.clone())),
        FileType::Java => Box::new(java::JavaExtractor::new(parser_pool.clone())),
        FileType::C => Box::new(c::CExtractor::new(parser_pool.clone())),
        FileType::Cpp => Box::new(cpp::CppExtractor::new(parser_pool.clone())),
        FileType::CSharp => Box::new(csharp::CSharpExtractor::new(parser_pool.clone())),
        FileType::Generic => Box::new(generic::GenericExtractor::new(parser_pool.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_every_recognised_extension() {
        let pool = crate::parser_pool::create_parser_pool();
        for name in [
            "main.rs", "app.ts", "index.js", "lib.py", "main.go", "Main.java", "main.c", "main.cpp", "Program.cs",
        ] {
            let path = std::path::PathBuf::from(name);
            assert!(get_extractor(&path, &pool).is_some(), "missing extractor for {name}");
        }
    }

    #[test]
    fn unrecognised_extensions_are_not_indexed() {
        let pool = crate::parser_pool::create_parser_pool();
        for name in ["README.txt", "Cargo.lock", "data.json", ".gitignore"] {
            let path = std::path::PathBuf::from(name);
            assert!(get_extractor(&path, &pool).is_none(), "should not index {name}");
        }
    }
}
