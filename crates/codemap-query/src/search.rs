//! `search_by_signature`: wildcard search over node signatures, ranked
//! exact-match > prefix > contains.

use serde::Serialize;

use codemap_core::{Node, Store};

use crate::error::{CodemapError, Result};

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub node: Node,
    pub rank: MatchRank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MatchRank {
    Exact,
    Prefix,
    Contains,
}

pub fn search_by_signature(store: &Store, pattern: &str, scope_path: Option<&str>) -> Result<Vec<SearchHit>> {
    if pattern.is_empty() {
        return Err(CodemapError::InvalidInput("pattern must not be empty".to_string()));
    }
    let candidates = store.signature_search(pattern, scope_path)?;
    if candidates.is_empty() {
        return Err(CodemapError::NotFound(format!("no signature matching {pattern:?}")));
    }

    let literal = pattern.trim_matches(|c| c == '%' || c == '*');
    let mut hits: Vec<SearchHit> = candidates
        .into_iter()
        .map(|node| {
            let rank = rank_match(&node.signature, pattern, literal);
            SearchHit { node, rank }
        })
        .collect();
    hits.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.node.name.cmp(&b.node.name)));
    Ok(hits)
}

fn rank_match(signature: &str, pattern: &str, literal: &str) -> MatchRank {
    if signature == pattern || signature == literal {
        MatchRank::Exact
    } else if signature.starts_with(literal) {
        MatchRank::Prefix
    } else {
        MatchRank::Contains
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::{NodeId, NodeKind, Visibility};

    fn node(name: &str, signature: &str) -> Node {
        Node {
            id: NodeId::new("store.rs", name),
            name: name.to_string(),
            qualified_name: name.to_string(),
            kind: NodeKind::Method,
            file_path: "store.rs".to_string(),
            start_line: 1,
            end_line: 2,
            signature: signature.to_string(),
            docstring: String::new(),
            decorators: Vec::new(),
            visibility: Visibility::Public,
            language: Some(codemap_core::Language::Rust),
        }
    }

    #[test]
    fn ranks_exact_match_first() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_node(&node("upsert_node", "fn upsert_node(self, node: Node) -> None")).unwrap();
        store.upsert_node(&node("other", "fn other(node: Node) -> bool")).unwrap();

        let hits = search_by_signature(&store, "%Node%", None).unwrap();
        assert_eq!(hits.len(), 2);

        let exact = search_by_signature(&store, "fn upsert_node(self, node: Node) -> None", None).unwrap();
        assert_eq!(exact[0].node.name, "upsert_node");
        assert_eq!(exact[0].rank, MatchRank::Exact);
    }

    #[test]
    fn empty_pattern_is_invalid() {
        let store = Store::open_in_memory().unwrap();
        let err = search_by_signature(&store, "", None).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::InvalidInput);
    }
}
