//! Thin wrappers matching the wire-level tool surface: same names, same
//! input/output shape, `response_format` selecting Markdown vs. JSON. The
//! typed operations in the sibling modules do the actual work; this is
//! the boundary an HTTP or MCP transport would sit behind, not implemented
//! in this workspace.

use std::path::Path;

use codemap_core::{IgnoreRules, Store};
use codemap_indexer::resolver::ModuleRegistry;

use crate::callstack::{self, Direction};
use crate::dependencies;
use crate::error::Result;
use crate::impact;
use crate::references;
use crate::reindex;
use crate::response::{render, ResponseFormat, ToolResponse};
use crate::search;
use crate::summary;

pub fn get_structural_summary(
    store: &Store,
    file_path: &str,
    limit: usize,
    offset: usize,
    format: ResponseFormat,
) -> Result<ToolResponse> {
    let result = summary::get_structural_summary(store, file_path, limit, offset)?;
    Ok(render(&result, format))
}

pub fn get_call_stack(
    store: &Store,
    node_name: &str,
    file_path: Option<&str>,
    direction: &str,
    depth: u32,
    format: ResponseFormat,
) -> Result<ToolResponse> {
    let direction = Direction::parse(direction)?;
    let result = callstack::get_call_stack(store, node_name, file_path, direction, depth)?;
    Ok(render(&result, format))
}

pub fn impact_analysis(store: &Store, file_path: &str, format: ResponseFormat) -> Result<ToolResponse> {
    let result = impact::impact_analysis(store, file_path)?;
    Ok(render(&result, format))
}

pub fn get_dependencies(
    store: &Store,
    registry: &ModuleRegistry,
    file_path: &str,
    format: ResponseFormat,
) -> Result<ToolResponse> {
    let result = dependencies::get_dependencies(store, registry, file_path)?;
    Ok(render(&result, format))
}

pub fn find_references(
    store: &Store,
    symbol_name: &str,
    scope_path: Option<&str>,
    format: ResponseFormat,
) -> Result<ToolResponse> {
    let result = references::find_references(store, symbol_name, scope_path)?;
    Ok(render(&result, format))
}

pub fn search_by_signature(
    store: &Store,
    pattern: &str,
    scope_path: Option<&str>,
    format: ResponseFormat,
) -> Result<ToolResponse> {
    let result = search::search_by_signature(store, pattern, scope_path)?;
    Ok(render(&result, format))
}

pub fn reindex_project(root: &Path, format: ResponseFormat) -> Result<ToolResponse> {
    let result = reindex::reindex_project(root)?;
    Ok(render(&result, format))
}

/// Build the module registry a `get_dependencies` call needs. Exposed
/// separately so callers that issue many dependency queries against the
/// same project only build it once.
pub fn build_registry(root: &Path) -> ModuleRegistry {
    let ignore_rules = IgnoreRules::load(root);
    ModuleRegistry::build(root, &ignore_rules)
}
