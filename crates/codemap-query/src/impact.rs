//! `impact_analysis`: reverse BFS over `calls` edges from a file's nodes,
//! capped at three levels and grouped by caller file.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use codemap_core::{EdgeKind, Node, Store};

use crate::error::{CodemapError, Result};

const MAX_LEVELS: u32 = 3;

#[derive(Debug, Serialize)]
pub struct ImpactLevel {
    pub level: u32,
    /// Grouped by caller file path, nodes sorted by name within a group.
    pub files: Vec<ImpactFileGroup>,
}

#[derive(Debug, Serialize)]
pub struct ImpactFileGroup {
    pub file_path: String,
    pub nodes: Vec<Node>,
}

pub fn impact_analysis(store: &Store, file_path: &str) -> Result<Vec<ImpactLevel>> {
    let origin_nodes = store.nodes_by_file(file_path)?;
    if origin_nodes.is_empty() {
        return Err(CodemapError::NotFound(format!("no nodes indexed for {file_path}")));
    }
    let origin_ids: HashSet<_> = origin_nodes.iter().map(|n| n.id).collect();

    let mut visited = origin_ids.clone();
    let mut frontier: Vec<Node> = origin_nodes;
    let mut levels = Vec::new();

    for level in 1..=MAX_LEVELS {
        let mut callers = Vec::new();
        for node in &frontier {
            for edge in store.edges_to(node.id, Some(EdgeKind::Calls))? {
                if visited.contains(&edge.from_id) {
                    continue;
                }
                let Some(caller) = store.node_by_id(edge.from_id)? else { continue };
                if caller.file_path == file_path {
                    // Don't cross back into the origin file.
                    continue;
                }
                visited.insert(caller.id);
                callers.push(caller);
            }
        }
        if callers.is_empty() {
            break;
        }
        levels.push(ImpactLevel {
            level,
            files: group_by_file(&callers),
        });
        frontier = callers;
    }

    Ok(levels)
}

fn group_by_file(nodes: &[Node]) -> Vec<ImpactFileGroup> {
    let mut by_file: HashMap<String, Vec<Node>> = HashMap::new();
    for node in nodes {
        by_file.entry(node.file_path.clone()).or_default().push(node.clone());
    }
    let mut groups: Vec<ImpactFileGroup> = by_file
        .into_iter()
        .map(|(file_path, mut nodes)| {
            nodes.sort_by(|a, b| a.name.cmp(&b.name));
            ImpactFileGroup { file_path, nodes }
        })
        .collect();
    groups.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::{Edge, NodeId, NodeKind, Visibility};

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
    fn caps_transitive_impact_at_three_levels() {
        let store = Store::open_in_memory().unwrap();
        let a = fn_node("a.py", "a");
        let b = fn_node("b.py", "b");
        let c = fn_node("c.py", "c");
        let d = fn_node("d.py", "d");
        let e = fn_node("e.py", "e");
        for n in [&a, &b, &c, &d, &e] {
            store.upsert_node(n).unwrap();
        }
        store.upsert_edge(&Edge::new(b.id, a.id, EdgeKind::Calls, Some(1))).unwrap();
        store.upsert_edge(&Edge::new(c.id, b.id, EdgeKind::Calls, Some(1))).unwrap();
        store.upsert_edge(&Edge::new(d.id, c.id, EdgeKind::Calls, Some(1))).unwrap();
        store.upsert_edge(&Edge::new(e.id, d.id, EdgeKind::Calls, Some(1))).unwrap();

        let levels = impact_analysis(&store, "a.py").unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0].files[0].file_path, "b.py");
        assert_eq!(levels[1].files[0].file_path, "c.py");
        assert_eq!(levels[2].files[0].file_path, "d.py");
        assert!(!levels.iter().any(|l| l.files.iter().any(|f| f.file_path == "e.py")));
    }

    #[test]
    fn unindexed_file_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = impact_analysis(&store, "missing.py").unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::NotFound);
    }
}
