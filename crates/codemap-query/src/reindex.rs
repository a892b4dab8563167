//! `reindex_project`: the sole mutator among the six tool-surface
//! operations. Thin wrapper over [`codemap_indexer::driver::reindex_all`].

use std::path::Path;

use serde::Serialize;

use codemap_core::{ChangeEvent, IgnoreRules};

use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct ReindexReport {
    pub files_indexed: usize,
    pub diagnostics: Vec<(String, String)>,
    pub nodes_changed: usize,
    pub edges_changed: usize,
}

pub fn reindex_project(root: &Path) -> Result<ReindexReport> {
    let ignore_rules = IgnoreRules::load(root);
    let report = codemap_indexer::driver::reindex_all(root, &ignore_rules)?;
    let ChangeEvent {
        nodes_changed,
        edges_changed,
        ..
    } = report.change;

    Ok(ReindexReport {
        files_indexed: report.files_indexed,
        diagnostics: report.diagnostics,
        nodes_changed,
        edges_changed,
    })
}
