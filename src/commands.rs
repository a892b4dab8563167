//! CLI command implementation: the single `reindex` entry point.

use std::path::Path;

use codemap_query::reindex::{reindex_project, ReindexReport};

pub fn reindex(root: &Path) -> anyhow::Result<ReindexReport> {
    tracing::info!(root = %root.display(), "reindexing project");
    let report = reindex_project(root)?;
    Ok(report)
}
