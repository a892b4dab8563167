//! Persistent, file-backed graph store (SQLite via `rusqlite`).
//!
//! Two logical tables, `nodes` and `edges`, indexed on `nodes.file_path`,
//! `edges.from_id` and `edges.to_id`. The indexing driver is the sole
//! writer; the query engine issues many concurrent reads. `clear_file`
//! followed by the matching `upsert_*` batch runs inside one transaction,
//! so a reader never observes a file half-refreshed.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;

use crate::model::{Edge, EdgeKind, Node, NodeId, NodeKind, Visibility};

/// Directory the store lives under, relative to a project root.
pub const STORE_DIR: &str = ".codemap";
/// Database file name within [`STORE_DIR`].
pub const STORE_FILE: &str = "graph.db3";

pub fn default_store_path(root: &Path) -> PathBuf {
    root.join(STORE_DIR).join(STORE_FILE)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to create store directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("stored row had invalid kind {0:?}")]
    InvalidKind(String),
    #[error("stored row had invalid visibility {0:?}")]
    InvalidVisibility(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle to the persistent graph store for one project root.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if absent) the store at the default path under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let path = default_store_path(root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Self::open_at(&path)
    }

    /// Open (creating if absent) the store at an explicit path. Used by
    /// tests and by callers that want a non-default location, e.g. `:memory:`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by unit tests that don't need disk persistence.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS nodes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                qualified_name TEXT NOT NULL,
                kind TEXT NOT NULL,
                file_path TEXT NOT NULL,
                start_line INTEGER NOT NULL,
                end_line INTEGER NOT NULL,
                signature TEXT NOT NULL,
                docstring TEXT NOT NULL,
                decorators TEXT NOT NULL,
                visibility TEXT NOT NULL,
                language TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_nodes_file_path ON nodes(file_path);
            CREATE INDEX IF NOT EXISTS idx_nodes_name ON nodes(name);
            CREATE INDEX IF NOT EXISTS idx_nodes_qualified_name ON nodes(qualified_name);

            CREATE TABLE IF NOT EXISTS edges (
                id TEXT PRIMARY KEY,
                from_id TEXT NOT NULL,
                to_id TEXT NOT NULL,
                relation TEXT NOT NULL,
                site_line INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_edges_from_id ON edges(from_id);
            CREATE INDEX IF NOT EXISTS idx_edges_to_id ON edges(to_id);",
        )?;
        Ok(())
    }

    /// Begin the transaction a per-file refresh runs inside: `clear_file`
    /// followed by the batch of `upsert_node`/`upsert_edge` calls that
    /// replace it. Dropping the returned guard without `commit` rolls back.
    pub fn begin_file_refresh(&mut self) -> Result<FileRefresh<'_>> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(FileRefresh { conn: &self.conn })
    }

    /// Insert-or-replace a node by ID.
    pub fn upsert_node(&self, node: &Node) -> Result<()> {
        upsert_node(&self.conn, node)
    }

    /// Insert an edge. A duplicate `(from_id, to_id, relation)` triple
    /// keyed by its derived ID is a no-op.
    pub fn upsert_edge(&self, edge: &Edge) -> Result<()> {
        upsert_edge(&self.conn, edge)
    }

    /// Delete all nodes with `file_path = path` and all edges with either
    /// endpoint among them.
    pub fn clear_file(&self, file_path: &str) -> Result<()> {
        clear_file(&self.conn, file_path)
    }

    pub fn nodes_by_file(&self, file_path: &str) -> Result<Vec<Node>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, qualified_name, kind, file_path, start_line, end_line,
                    signature, docstring, decorators, visibility, language
             FROM nodes WHERE file_path = ?1 ORDER BY start_line ASC",
        )?;
        let rows = stmt.query_map(params![file_path], row_to_node)?;
        collect(rows)
    }

    pub fn nodes_by_name(&self, name: &str, file_path: Option<&str>) -> Result<Vec<Node>> {
        let mut stmt = if file_path.is_some() {
            self.conn.prepare(
                "SELECT id, name, qualified_name, kind, file_path, start_line, end_line,
                        signature, docstring, decorators, visibility, language
                 FROM nodes WHERE name = ?1 AND file_path = ?2 ORDER BY start_line ASC",
            )?
        } else {
            self.conn.prepare(
                "SELECT id, name, qualified_name, kind, file_path, start_line, end_line,
                        signature, docstring, decorators, visibility, language
                 FROM nodes WHERE name = ?1 ORDER BY file_path ASC, start_line ASC",
            )?
        };
        let rows = if let Some(fp) = file_path {
            stmt.query_map(params![name, fp], row_to_node)?
        } else {
            stmt.query_map(params![name], row_to_node)?
        };
        collect(rows)
    }

    pub fn node_by_id(&self, id: NodeId) -> Result<Option<Node>> {
        self.conn
            .query_row(
                "SELECT id, name, qualified_name, kind, file_path, start_line, end_line,
                        signature, docstring, decorators, visibility, language
                 FROM nodes WHERE id = ?1",
                params![id.as_hex()],
                row_to_node,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn node_by_qualified_name(&self, qualified_name: &str) -> Result<Option<Node>> {
        self.conn
            .query_row(
                "SELECT id, name, qualified_name, kind, file_path, start_line, end_line,
                        signature, docstring, decorators, visibility, language
                 FROM nodes WHERE qualified_name = ?1 LIMIT 1",
                params![qualified_name],
                row_to_node,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn edges_from(&self, id: NodeId, relation: Option<EdgeKind>) -> Result<Vec<Edge>> {
        let mut stmt = if relation.is_some() {
            self.conn.prepare(
                "SELECT from_id, to_id, relation, site_line FROM edges
                 WHERE from_id = ?1 AND relation = ?2",
            )?
        } else {
            self.conn
                .prepare("SELECT from_id, to_id, relation, site_line FROM edges WHERE from_id = ?1")?
        };
        let rows = if let Some(rel) = relation {
            stmt.query_map(params![id.as_hex(), rel.as_str()], row_to_edge)?
        } else {
            stmt.query_map(params![id.as_hex()], row_to_edge)?
        };
        collect(rows)
    }

    pub fn edges_to(&self, id: NodeId, relation: Option<EdgeKind>) -> Result<Vec<Edge>> {
        let mut stmt = if relation.is_some() {
            self.conn.prepare(
                "SELECT from_id, to_id, relation, site_line FROM edges
                 WHERE to_id = ?1 AND relation = ?2",
            )?
        } else {
            self.conn
                .prepare("SELECT from_id, to_id, relation, site_line FROM edges WHERE to_id = ?1")?
        };
        let rows = if let Some(rel) = relation {
            stmt.query_map(params![id.as_hex(), rel.as_str()], row_to_edge)?
        } else {
            stmt.query_map(params![id.as_hex()], row_to_edge)?
        };
        collect(rows)
    }

    /// Search node names/qualified names by `%`-wildcard `pattern` (SQL
    /// `LIKE` semantics), optionally scoped to a file or directory prefix.
    pub fn signature_search(&self, pattern: &str, scope_path: Option<&str>) -> Result<Vec<Node>> {
        let like = pattern.replace('*', "%");
        let mut stmt = if scope_path.is_some() {
            self.conn.prepare(
                "SELECT id, name, qualified_name, kind, file_path, start_line, end_line,
                        signature, docstring, decorators, visibility, language
                 FROM nodes
                 WHERE (name LIKE ?1 OR qualified_name LIKE ?1 OR signature LIKE ?1)
                   AND file_path LIKE ?2
                 ORDER BY name ASC",
            )?
        } else {
            self.conn.prepare(
                "SELECT id, name, qualified_name, kind, file_path, start_line, end_line,
                        signature, docstring, decorators, visibility, language
                 FROM nodes
                 WHERE name LIKE ?1 OR qualified_name LIKE ?1 OR signature LIKE ?1
                 ORDER BY name ASC",
            )?
        };
        let rows = if let Some(scope) = scope_path {
            let scope_like = format!("{}%", scope.trim_end_matches('/'));
            stmt.query_map(params![like, scope_like], row_to_node)?
        } else {
            stmt.query_map(params![like], row_to_node)?
        };
        collect(rows)
    }

    pub fn all_nodes(&self) -> Result<Vec<Node>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, qualified_name, kind, file_path, start_line, end_line,
                    signature, docstring, decorators, visibility, language
             FROM nodes ORDER BY file_path ASC, start_line ASC",
        )?;
        let rows = stmt.query_map([], row_to_node)?;
        collect(rows)
    }

    pub fn all_edges(&self) -> Result<Vec<Edge>> {
        let mut stmt = self
            .conn
            .prepare("SELECT from_id, to_id, relation, site_line FROM edges")?;
        let rows = stmt.query_map([], row_to_edge)?;
        collect(rows)
    }

    pub fn node_count(&self) -> Result<u64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM nodes", [], |r| r.get::<_, i64>(0))? as u64)
    }

    pub fn edge_count(&self) -> Result<u64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM edges", [], |r| r.get::<_, i64>(0))? as u64)
    }
}

/// Guard for a single `clear_file` + `upsert_*` transaction. `commit` must
/// be called explicitly; dropping without committing rolls back, so a
/// panicking extractor never leaves a half-written file behind.
pub struct FileRefresh<'a> {
    conn: &'a Connection,
}

impl<'a> FileRefresh<'a> {
    pub fn clear_file(&self, file_path: &str) -> Result<()> {
        clear_file(self.conn, file_path)
    }

    pub fn upsert_node(&self, node: &Node) -> Result<()> {
        upsert_node(self.conn, node)
    }

    pub fn upsert_edge(&self, edge: &Edge) -> Result<()> {
        upsert_edge(self.conn, edge)
    }

    pub fn commit(self, file_path: &str, nodes: usize, edges: usize) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        debug!(file = file_path, nodes, edges, "committed file refresh");
        Ok(())
    }

    pub fn rollback(self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

fn clear_file(conn: &Connection, file_path: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM edges WHERE from_id IN (SELECT id FROM nodes WHERE file_path = ?1)
            OR to_id IN (SELECT id FROM nodes WHERE file_path = ?1)",
        params![file_path],
    )?;
    conn.execute("DELETE FROM nodes WHERE file_path = ?1", params![file_path])?;
    Ok(())
}

fn upsert_node(conn: &Connection, node: &Node) -> Result<()> {
    conn.execute(
        "INSERT INTO nodes (id, name, qualified_name, kind, file_path, start_line, end_line,
                             signature, docstring, decorators, visibility, language)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            qualified_name = excluded.qualified_name,
            kind = excluded.kind,
            file_path = excluded.file_path,
            start_line = excluded.start_line,
            end_line = excluded.end_line,
            signature = excluded.signature,
            docstring = excluded.docstring,
            decorators = excluded.decorators,
            visibility = excluded.visibility,
            language = excluded.language",
        params![
            node.id.as_hex(),
            node.name,
            node.qualified_name,
            node.kind.as_str(),
            node.file_path,
            node.start_line,
            node.end_line,
            node.signature,
            node.docstring,
            serde_json::to_string(&node.decorators).unwrap_or_default(),
            node.visibility.as_str(),
            node.language.map(|l| format!("{:?}", l)),
        ],
    )?;
    Ok(())
}

fn upsert_edge(conn: &Connection, edge: &Edge) -> Result<()> {
    let id = edge.id();
    conn.execute(
        "INSERT OR IGNORE INTO edges (id, from_id, to_id, relation, site_line)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.as_hex(),
            edge.from_id.as_hex(),
            edge.to_id.as_hex(),
            edge.relation.as_str(),
            edge.site_line,
        ],
    )?;
    Ok(())
}

fn collect<I>(rows: I) -> Result<Vec<I::Item>>
where
    I: Iterator<Item = std::result::Result<I::Item, rusqlite::Error>>,
{
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn row_to_node(row: &rusqlite::Row<'_>) -> std::result::Result<Node, rusqlite::Error> {
    let id_hex: String = row.get(0)?;
    let kind_str: String = row.get(3)?;
    let visibility_str: String = row.get(10)?;
    let decorators_json: String = row.get(9)?;
    let language_str: Option<String> = row.get(11)?;

    let kind = NodeKind::from_str(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(StoreError::InvalidKind(kind_str.clone())),
        )
    })?;
    let visibility = Visibility::from_str(&visibility_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            10,
            rusqlite::types::Type::Text,
            Box::new(StoreError::InvalidVisibility(visibility_str.clone())),
        )
    })?;
    let decorators: Vec<String> = serde_json::from_str(&decorators_json).unwrap_or_default();

    Ok(Node {
        id: NodeId(u64::from_str_radix(&id_hex, 16).unwrap_or_default()),
        name: row.get(1)?,
        qualified_name: row.get(2)?,
        kind,
        file_path: row.get(4)?,
        start_line: row.get(5)?,
        end_line: row.get(6)?,
        signature: row.get(7)?,
        docstring: row.get(8)?,
        decorators,
        visibility,
        language: language_str.and_then(|s| match s.as_str() {
            "Rust" => Some(crate::model::Language::Rust),
            "Python" => Some(crate::model::Language::Python),
            "JavaScript" => Some(crate::model::Language::JavaScript),
            "TypeScript" => Some(crate::model::Language::TypeScript),
            "Go" => Some(crate::model::Language::Go),
            "Java" => Some(crate::model::Language::Java),
            "C" => Some(crate::model::Language::C),
            "Cpp" => Some(crate::model::Language::Cpp),
            _ => Some(crate::model::Language::Other),
        }),
    })
}

fn row_to_edge(row: &rusqlite::Row<'_>) -> std::result::Result<Edge, rusqlite::Error> {
    let from_hex: String = row.get(0)?;
    let to_hex: String = row.get(1)?;
    let relation_str: String = row.get(2)?;
    let relation = EdgeKind::from_str(&relation_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(StoreError::InvalidKind(relation_str.clone())),
        )
    })?;
    Ok(Edge {
        from_id: NodeId(u64::from_str_radix(&from_hex, 16).unwrap_or_default()),
        to_id: NodeId(u64::from_str_radix(&to_hex, 16).unwrap_or_default()),
        relation,
        site_line: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node, NodeKind, Visibility};

    fn sample_node(file: &str, name: &str, line: u32) -> Node {
        Node {
            id: NodeId::new(file, name),
            name: name.to_string(),
            qualified_name: name.to_string(),
            kind: NodeKind::Function,
            file_path: file.to_string(),
            start_line: line,
            end_line: line + 1,
            signature: format!("fn {}()", name),
            docstring: String::new(),
            decorators: Vec::new(),
            visibility: Visibility::Public,
            language: Some(crate::model::Language::Rust),
        }
    }

    #[test]
    fn upsert_and_fetch_node() {
        let store = Store::open_in_memory().unwrap();
        let node = sample_node("src/lib.rs", "foo", 1);
        store.upsert_node(&node).unwrap();

        let fetched = store.node_by_id(node.id).unwrap().unwrap();
        assert_eq!(fetched.name, "foo");
        assert_eq!(fetched.file_path, "src/lib.rs");
    }

    #[test]
    fn clear_file_removes_nodes_and_edges() {
        let store = Store::open_in_memory().unwrap();
        let a = sample_node("src/lib.rs", "a", 1);
        let b = sample_node("src/lib.rs", "b", 5);
        store.upsert_node(&a).unwrap();
        store.upsert_node(&b).unwrap();
        store
            .upsert_edge(&Edge::new(a.id, b.id, EdgeKind::Calls, Some(2)))
            .unwrap();

        assert_eq!(store.nodes_by_file("src/lib.rs").unwrap().len(), 2);
        assert_eq!(store.edges_from(a.id, None).unwrap().len(), 1);

        store.clear_file("src/lib.rs").unwrap();
        assert!(store.nodes_by_file("src/lib.rs").unwrap().is_empty());
        assert!(store.edges_from(a.id, None).unwrap().is_empty());
    }

    #[test]
    fn upsert_edge_is_idempotent_by_triple() {
        let store = Store::open_in_memory().unwrap();
        let a = sample_node("src/lib.rs", "a", 1);
        let b = sample_node("src/lib.rs", "b", 5);
        store.upsert_node(&a).unwrap();
        store.upsert_node(&b).unwrap();

        let edge = Edge::new(a.id, b.id, EdgeKind::Calls, Some(2));
        store.upsert_edge(&edge).unwrap();
        store.upsert_edge(&edge).unwrap();

        assert_eq!(store.edges_from(a.id, None).unwrap().len(), 1);
    }

    #[test]
    fn signature_search_matches_wildcard() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_node(&sample_node("src/lib.rs", "get_user", 1)).unwrap();
        store.upsert_node(&sample_node("src/lib.rs", "get_account", 10)).unwrap();
        store.upsert_node(&sample_node("src/lib.rs", "delete_user", 20)).unwrap();

        let results = store.signature_search("get_%", None).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn file_refresh_transaction_commits_atomically() {
        let mut store = Store::open_in_memory().unwrap();
        {
            let refresh = store.begin_file_refresh().unwrap();
            refresh.clear_file("src/lib.rs").unwrap();
            let node = sample_node("src/lib.rs", "foo", 1);
            refresh.upsert_node(&node).unwrap();
            refresh.commit("src/lib.rs", 1, 0).unwrap();
        }
        assert_eq!(store.nodes_by_file("src/lib.rs").unwrap().len(), 1);
    }
}
