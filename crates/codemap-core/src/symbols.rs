//! Thread-safe symbol table for cross-file resolution.
//!
//! The indexing driver resolves placeholder edges with a single-threaded,
//! order-sensitive index (first-writer-wins on a name collision), since the
//! result has to be deterministic regardless of how many cores indexed the
//! project. This table is the concurrent counterpart for callers that read
//! and write symbols from multiple threads at once — the live watch loop and
//! any future multi-request query server — where last-writer-wins on a
//! rename is the correct behaviour rather than a defect.

use dashmap::DashMap;

use crate::model::NodeId;

/// Maps qualified names to node IDs, plus a reverse per-file index so a
/// file's symbols can all be dropped in one call when it is reindexed.
pub struct SymbolTable {
    symbols: DashMap<String, NodeId>,
    file_symbols: DashMap<String, Vec<String>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: DashMap::new(),
            file_symbols: DashMap::new(),
        }
    }

    pub fn insert(&self, qualified_name: String, node_id: NodeId, file_path: String) {
        self.symbols.insert(qualified_name.clone(), node_id);
        self.file_symbols.entry(file_path).or_default().push(qualified_name);
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<NodeId> {
        self.symbols.get(qualified_name).map(|r| *r.value())
    }

    pub fn symbols_in_file(&self, file_path: &str) -> Vec<NodeId> {
        self.file_symbols
            .get(file_path)
            .map(|r| r.value().iter().filter_map(|name| self.lookup(name)).collect())
            .unwrap_or_default()
    }

    /// Drop every symbol this file previously contributed. Called before a
    /// file's fresh symbols are inserted on reindex.
    pub fn remove_file(&self, file_path: &str) {
        if let Some((_, names)) = self.file_symbols.remove(file_path) {
            for name in names {
                self.symbols.remove(&name);
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
