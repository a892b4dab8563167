//! `get_structural_summary`: the ordered, paginated list of nodes defined
//! in one file.

use serde::Serialize;

use codemap_core::{Node, Store};

use crate::error::{CodemapError, Result};

#[derive(Debug, Serialize)]
pub struct StructuralSummary {
    pub file_path: String,
    pub nodes: Vec<Node>,
    pub total: usize,
    pub has_more: bool,
}

pub fn get_structural_summary(store: &Store, file_path: &str, limit: usize, offset: usize) -> Result<StructuralSummary> {
    let all = store.nodes_by_file(file_path)?;
    if all.is_empty() {
        return Err(CodemapError::NotFound(format!("no nodes indexed for {file_path}")));
    }
    let total = all.len();
    let page: Vec<Node> = all.into_iter().skip(offset).take(limit).collect();
    let has_more = offset + page.len() < total;

    Ok(StructuralSummary {
        file_path: file_path.to_string(),
        nodes: page,
        total,
        has_more,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::{NodeId, NodeKind, Visibility};

    fn node(file: &str, name: &str, line: u32) -> Node {
        Node {
            id: NodeId::new(file, name),
            name: name.to_string(),
            qualified_name: name.to_string(),
            kind: NodeKind::Function,
            file_path: file.to_string(),
            start_line: line,
            end_line: line + 1,
            signature: format!("fn {name}()"),
            docstring: String::new(),
            decorators: Vec::new(),
            visibility: Visibility::Public,
            language: Some(codemap_core::Language::Rust),
        }
    }

    #[test]
    fn paginates_and_reports_total() {
        let store = Store::open_in_memory().unwrap();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            store.upsert_node(&node("lib.rs", name, i as u32 + 1)).unwrap();
        }

        let page = get_structural_summary(&store, "lib.rs", 2, 0).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.nodes.len(), 2);
        assert!(page.has_more);

        let rest = get_structural_summary(&store, "lib.rs", 2, 2).unwrap();
        assert_eq!(rest.nodes.len(), 1);
        assert!(!rest.has_more);
    }

    #[test]
    fn unindexed_file_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = get_structural_summary(&store, "missing.rs", 100, 0).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::NotFound);
    }
}
