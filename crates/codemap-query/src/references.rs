//! `find_references`: every edge whose target name matches a symbol,
//! grouped by the referencing node's file.

use std::collections::HashMap;

use serde::Serialize;

use codemap_core::{EdgeKind, Store};

use crate::error::{CodemapError, Result};

#[derive(Debug, Serialize)]
pub struct Reference {
    pub from_qualified_name: String,
    pub from_file_path: String,
    pub relation: EdgeKind,
    pub site_line: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ReferenceGroup {
    pub file_path: String,
    pub references: Vec<Reference>,
}

pub fn find_references(store: &Store, symbol_name: &str, scope_path: Option<&str>) -> Result<Vec<ReferenceGroup>> {
    let targets = store.nodes_by_name(symbol_name, None)?;
    if targets.is_empty() {
        return Err(CodemapError::NotFound(format!("no symbol named {symbol_name:?}")));
    }

    let mut by_file: HashMap<String, Vec<Reference>> = HashMap::new();
    for target in &targets {
        for edge in store.edges_to(target.id, None)? {
            let Some(source) = store.node_by_id(edge.from_id)? else { continue };
            if let Some(scope) = scope_path {
                if !source.file_path.starts_with(scope.trim_end_matches('/')) {
                    continue;
                }
            }
            by_file.entry(source.file_path.clone()).or_default().push(Reference {
                from_qualified_name: source.qualified_name.clone(),
                from_file_path: source.file_path.clone(),
                relation: edge.relation,
                site_line: edge.site_line,
            });
        }
    }

    if by_file.is_empty() {
        return Err(CodemapError::NotFound(format!(
            "no references to {symbol_name:?} within the given scope"
        )));
    }

    let mut groups: Vec<ReferenceGroup> = by_file
        .into_iter()
        .map(|(file_path, references)| ReferenceGroup { file_path, references })
        .collect();
    groups.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::{Edge, Node, NodeId, NodeKind, Visibility};

    fn fn_node(file: &str, name: &str) -> Node {
        Node {
            id: NodeId::new(file, name),
            name: name.to_string(),
            qualified_name: name.to_string(),
            kind: NodeKind::Function,
            file_path: file.to_string(),
            start_line: 1,
            end_line: 2,
            signature: format!("fn {name}()"),
            docstring: String::new(),
            decorators: Vec::new(),
            visibility: Visibility::Public,
            language: Some(codemap_core::Language::Python),
        }
    }

    #[test]
    fn groups_references_by_calling_file() {
        let store = Store::open_in_memory().unwrap();
        let f = fn_node("a.py", "f");
        let h = fn_node("b.py", "h");
        store.upsert_node(&f).unwrap();
        store.upsert_node(&h).unwrap();
        store.upsert_edge(&Edge::new(h.id, f.id, EdgeKind::Calls, Some(3))).unwrap();

        let groups = find_references(&store, "f", None).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].file_path, "b.py");
        assert_eq!(groups[0].references[0].site_line, Some(3));
    }

    #[test]
    fn missing_symbol_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = find_references(&store, "ghost", None).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::NotFound);
    }
}
