//! Graph-change notifications.
//!
//! The driver and the watcher both publish a single textual event after a
//! committed re-index batch; this module is the shared vocabulary for that
//! event so neither crate has to depend on the other's internal types.

use serde::{Deserialize, Serialize};

/// What kind of batch produced the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeScope {
    /// A full `reindex_all` run.
    Full,
    /// A single file re-indexed (created/modified) or cleared (deleted).
    File,
}

/// Published strictly after the commit it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub scope: ChangeScope,
    /// Present for `ChangeScope::File`; the project-relative path that changed.
    pub file_path: Option<String>,
    pub nodes_changed: usize,
    pub edges_changed: usize,
}

impl ChangeEvent {
    pub fn full(nodes_changed: usize, edges_changed: usize) -> Self {
        ChangeEvent {
            scope: ChangeScope::Full,
            file_path: None,
            nodes_changed,
            edges_changed,
        }
    }

    pub fn file(file_path: impl Into<String>, nodes_changed: usize, edges_changed: usize) -> Self {
        ChangeEvent {
            scope: ChangeScope::File,
            file_path: Some(file_path.into()),
            nodes_changed,
            edges_changed,
        }
    }

    /// The wire form of the graph surface's streaming channel: a single
    /// textual `refresh` event.
    pub fn as_refresh_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"scope\":\"full\"}".to_string())
    }
}
