//! Indexing driver: walks a project, dispatches each file to its
//! [`LanguageExtractor`], resolves imports against a freshly-built
//! [`ModuleRegistry`], and commits the result to the [`Store`] one file at a
//! time inside [`codemap_core::store::FileRefresh`] transactions.

use std::path::Path;

use codemap_core::{ChangeEvent, Edge, EdgeKind, IgnoreRules, Language, Node, NodeId, Store, StoreError};
use ignore::WalkBuilder;
use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

use crate::languages::{get_extractor, MODULE_QUALIFIED_NAME};
use crate::parser_pool::{create_parser_pool, ParserPool};
use crate::resolver::{ModuleRegistry, Resolution};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, DriverError>;

/// Outcome of a `reindex_all`/`reindex_path` run.
#[derive(Debug)]
pub struct IndexReport {
    pub files_indexed: usize,
    /// `(project-relative path, message)` for every file that could not be
    /// fully extracted; the batch still ran to completion.
    pub diagnostics: Vec<(String, String)>,
    /// Published strictly after the commit it refers to — see caller's
    /// responsibility to forward this to whatever observes graph changes.
    pub change: ChangeEvent,
}

struct FileBatch {
    path: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// Re-walk `root` from scratch and refresh every non-ignored recognised
/// file's entry in the store.
pub fn reindex_all(root: &Path, ignore_rules: &IgnoreRules) -> Result<IndexReport> {
    let pool = create_parser_pool();

    // `ParserPool` hands out work over an `mpsc::Sender`, which is `Send`
    // but not `Sync` — each candidate gets its own clone up front so the
    // parallel step below never shares one `&ParserPool` across threads.
    let walker = WalkBuilder::new(root).hidden(false).standard_filters(false).build();
    let candidates: Vec<(std::path::PathBuf, String, ParserPool)> = walker
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            let rel = entry.path().strip_prefix(root).ok()?;
            let rel_str = codemap_core::model::normalize_path(rel);
            if ignore_rules.is_ignored(&rel_str) {
                return None;
            }
            Some((entry.path().to_path_buf(), rel_str, pool.clone()))
        })
        .collect();

    // Extraction is pure per file (parses `content`, walks the resulting
    // tree, never touches the store), so it parallelizes across files with
    // no coordination; `par_iter().map().collect()` preserves the original
    // walk order, which is what keeps `build_global_symbol_index`'s
    // first-writer-wins rule deterministic regardless of thread scheduling.
    let extracted: Vec<std::result::Result<Option<FileBatch>, (String, String)>> = candidates
        .par_iter()
        .map(|(absolute, rel_str, pool)| extract_file(absolute, rel_str, pool))
        .collect();

    let mut batches = Vec::new();
    let mut diagnostics = Vec::new();
    for result in extracted {
        match result {
            Ok(Some(batch)) => batches.push(batch),
            Ok(None) => {}
            Err((path, message)) => diagnostics.push((path, message)),
        }
    }

    let registry = ModuleRegistry::build(root, ignore_rules);
    let global_symbols = build_global_symbol_index(&batches);
    for batch in &mut batches {
        resolve_batch_edges(batch, &registry, |name| global_symbols.get(name).copied());
    }

    let mut store = Store::open(root)?;
    let mut total_nodes = 0;
    let mut total_edges = 0;
    for batch in &batches {
        commit_batch(&mut store, batch)?;
        total_nodes += batch.nodes.len();
        total_edges += batch.edges.len();
    }

    Ok(IndexReport {
        files_indexed: batches.len(),
        diagnostics,
        change: ChangeEvent::full(total_nodes, total_edges),
    })
}

/// Re-index a single file (or clear it from the store, if it no longer
/// exists). The module registry is rebuilt over the whole project so import
/// resolution reflects the project as it stands, not just the one file.
pub fn reindex_path(root: &Path, path: &Path) -> Result<IndexReport> {
    let absolute = if path.is_absolute() { path.to_path_buf() } else { root.join(path) };
    let rel = absolute.strip_prefix(root).unwrap_or(path).to_path_buf();
    let rel_str = codemap_core::model::normalize_path(&rel);

    let mut store = Store::open(root)?;

    if !absolute.exists() {
        store.clear_file(&rel_str)?;
        return Ok(IndexReport {
            files_indexed: 0,
            diagnostics: Vec::new(),
            change: ChangeEvent::file(rel_str, 0, 0),
        });
    }

    let pool = create_parser_pool();
    let (mut batch, diagnostics) = match extract_file(&absolute, &rel_str, &pool) {
        Ok(Some(batch)) => (batch, Vec::new()),
        Ok(None) => {
            store.clear_file(&rel_str)?;
            return Ok(IndexReport {
                files_indexed: 0,
                diagnostics: Vec::new(),
                change: ChangeEvent::file(rel_str, 0, 0),
            });
        }
        Err((path, message)) => {
            return Ok(IndexReport {
                files_indexed: 0,
                diagnostics: vec![(path, message)],
                change: ChangeEvent::file(rel_str, 0, 0),
            })
        }
    };

    let ignore_rules = IgnoreRules::load(root);
    let registry = ModuleRegistry::build(root, &ignore_rules);
    resolve_batch_edges(&mut batch, &registry, |name| {
        store
            .nodes_by_name(name, None)
            .ok()
            .and_then(|nodes| nodes.into_iter().find(|n| !n.is_placeholder()).map(|n| n.id))
    });

    commit_batch(&mut store, &batch)?;

    Ok(IndexReport {
        files_indexed: 1,
        diagnostics,
        change: ChangeEvent::file(rel_str, batch.nodes.len(), batch.edges.len()),
    })
}

fn extract_file(
    absolute_path: &Path,
    rel_path: &str,
    pool: &ParserPool,
) -> std::result::Result<Option<FileBatch>, (String, String)> {
    let Some(extractor) = get_extractor(Path::new(rel_path), pool) else { return Ok(None) };
    let content = std::fs::read(absolute_path).map_err(|e| (rel_path.to_string(), e.to_string()))?;

    match extractor.extract(Path::new(rel_path), &content) {
        Ok(result) => {
            for diagnostic in &result.diagnostics {
                warn!(file = %diagnostic.file_path, message = %diagnostic.message, "extraction diagnostic");
            }
            Ok(Some(FileBatch {
                path: rel_path.to_string(),
                nodes: result.nodes,
                edges: result.edges,
            }))
        }
        Err(err) => {
            warn!(file = %rel_path, error = %err, "extraction failed, skipping file");
            Err((rel_path.to_string(), err.to_string()))
        }
    }
}

/// Build a cross-file symbol index from every node this run extracted, so a
/// `calls`/`inherits`/`implements`/`references` placeholder in one file can
/// be rewritten onto the real definition living in another. Keyed by both
/// bare name and qualified name; first writer wins on a collision, matching
/// the specification's note that ambiguity between same-named symbols is
/// left to callers rather than resolved here.
fn build_global_symbol_index(batches: &[FileBatch]) -> std::collections::HashMap<String, NodeId> {
    let mut index = std::collections::HashMap::new();
    for batch in batches {
        for node in &batch.nodes {
            if node.is_placeholder() {
                continue;
            }
            index.entry(node.qualified_name.clone()).or_insert(node.id);
            index.entry(node.name.clone()).or_insert(node.id);
        }
    }
    index
}

/// Rewrite every edge whose target is a placeholder node into a reference to
/// the real node it names, when one can be found. `imports` edges are
/// resolved against the module registry (the placeholder's qualified name is
/// a dotted module path); every other relation — `calls`, `inherits`,
/// `implements`, `references` — is resolved by `find_symbol`, a cross-file
/// name lookup supplied by the caller (an in-memory index for a full
/// re-index, a store query for a single-file one). Placeholders that stay
/// unresolved (stdlib, third-party, or genuinely external/forward-unknown)
/// are left as they are.
fn resolve_batch_edges(
    batch: &mut FileBatch,
    registry: &ModuleRegistry,
    mut find_symbol: impl FnMut(&str) -> Option<NodeId>,
) {
    let language = Language::from_path(Path::new(&batch.path));
    let mut resolved_targets = Vec::new();

    for edge in &batch.edges {
        let Some(placeholder) = batch.nodes.iter().find(|n| n.id == edge.to_id && n.is_placeholder()) else {
            continue;
        };
        let target_id = if edge.relation == EdgeKind::Imports {
            match registry.resolve(&placeholder.qualified_name, &batch.path, language) {
                Resolution::Internal(target_path) if registry.contains_path(&target_path) => {
                    Some(NodeId::new(&target_path, MODULE_QUALIFIED_NAME))
                }
                _ => None,
            }
        } else {
            find_symbol(&placeholder.qualified_name).or_else(|| find_symbol(&placeholder.name))
        };
        if let Some(target_id) = target_id {
            resolved_targets.push((edge.to_id, target_id));
        }
    }

    for edge in &mut batch.edges {
        if let Some((_, target_id)) = resolved_targets.iter().find(|(old, _)| *old == edge.to_id) {
            edge.to_id = *target_id;
        }
    }

    let rewritten: std::collections::HashSet<NodeId> = resolved_targets.iter().map(|(old, _)| *old).collect();
    batch.nodes.retain(|n| !(n.is_placeholder() && rewritten.contains(&n.id)));
}

fn commit_batch(store: &mut Store, batch: &FileBatch) -> Result<()> {
    let refresh = store.begin_file_refresh()?;
    refresh.clear_file(&batch.path)?;
    for node in &batch.nodes {
        refresh.upsert_node(node)?;
    }
    for edge in &batch.edges {
        refresh.upsert_edge(edge)?;
    }
    refresh.commit(&batch.path, batch.nodes.len(), batch.edges.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::NodeKind;
    use std::fs;
    use tempfile::TempDir;

    fn write_repo(structure: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in structure {
            let full_path = dir.path().join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&full_path, content).unwrap();
        }
        dir
    }

    #[test]
    fn reindex_all_indexes_every_recognised_file() {
        let repo = write_repo(&[
            ("src/main.rs", "fn main() {}\n"),
            ("src/lib.py", "def helper():\n    pass\n"),
        ]);
        let ignore_rules = IgnoreRules::from_deny_list_and_patterns(codemap_core::ignore_rules::BUILTIN_DENY_LIST, "");
        let report = reindex_all(repo.path(), &ignore_rules).unwrap();
        assert_eq!(report.files_indexed, 2);
        assert!(report.diagnostics.is_empty());

        let store = Store::open(repo.path()).unwrap();
        assert!(store.nodes_by_file("src/main.rs").unwrap().iter().any(|n| n.name == "main"));
        assert!(store.nodes_by_file("src/lib.py").unwrap().iter().any(|n| n.name == "helper"));
    }

    #[test]
    fn reindex_all_skips_ignored_directories() {
        let repo = write_repo(&[
            ("src/main.rs", "fn main() {}\n"),
            ("node_modules/left-pad/index.js", "module.exports = 1;\n"),
        ]);
        let ignore_rules = IgnoreRules::from_deny_list_and_patterns(codemap_core::ignore_rules::BUILTIN_DENY_LIST, "");
        let report = reindex_all(repo.path(), &ignore_rules).unwrap();
        assert_eq!(report.files_indexed, 1);
    }

    #[test]
    fn reindex_path_refreshes_a_single_file_in_place() {
        let repo = write_repo(&[("src/main.rs", "fn main() {}\n")]);
        let ignore_rules = IgnoreRules::from_deny_list_and_patterns(codemap_core::ignore_rules::BUILTIN_DENY_LIST, "");
        reindex_all(repo.path(), &ignore_rules).unwrap();

        fs::write(repo.path().join("src/main.rs"), "fn main() {}\nfn helper() {}\n").unwrap();
        reindex_path(repo.path(), Path::new("src/main.rs")).unwrap();

        let store = Store::open(repo.path()).unwrap();
        let nodes = store.nodes_by_file("src/main.rs").unwrap();
        assert!(nodes.iter().any(|n| n.name == "helper" && n.kind == NodeKind::Function));
    }

    #[test]
    fn reindex_path_clears_a_deleted_file() {
        let repo = write_repo(&[("src/main.rs", "fn main() {}\n")]);
        let ignore_rules = IgnoreRules::from_deny_list_and_patterns(codemap_core::ignore_rules::BUILTIN_DENY_LIST, "");
        reindex_all(repo.path(), &ignore_rules).unwrap();

        fs::remove_file(repo.path().join("src/main.rs")).unwrap();
        let report = reindex_path(repo.path(), Path::new("src/main.rs")).unwrap();
        assert_eq!(report.change.nodes_changed, 0);

        let store = Store::open(repo.path()).unwrap();
        assert!(store.nodes_by_file("src/main.rs").unwrap().is_empty());
    }

    #[test]
    fn resolves_cross_file_python_import_to_the_real_module_node() {
        let repo = write_repo(&[
            ("pkg/helpers.py", "def helper():\n    pass\n"),
            ("pkg/main.py", "from pkg.helpers import helper\n"),
        ]);
        let ignore_rules = IgnoreRules::from_deny_list_and_patterns(codemap_core::ignore_rules::BUILTIN_DENY_LIST, "");
        reindex_all(repo.path(), &ignore_rules).unwrap();

        let store = Store::open(repo.path()).unwrap();
        let main_module = store
            .nodes_by_file("pkg/main.py")
            .unwrap()
            .into_iter()
            .find(|n| n.kind == NodeKind::Module)
            .unwrap();
        let helpers_module = store
            .nodes_by_file("pkg/helpers.py")
            .unwrap()
            .into_iter()
            .find(|n| n.kind == NodeKind::Module)
            .unwrap();

        let imports = store.edges_from(main_module.id, Some(EdgeKind::Imports)).unwrap();
        assert!(imports.iter().any(|e| e.to_id == helpers_module.id));
    }

    #[test]
    fn resolves_cross_file_call_to_an_imported_function() {
        let repo = write_repo(&[
            ("a.py", "def f():\n    pass\n"),
            ("b.py", "from a import f\n\ndef h():\n    f()\n"),
        ]);
        let ignore_rules = IgnoreRules::from_deny_list_and_patterns(codemap_core::ignore_rules::BUILTIN_DENY_LIST, "");
        reindex_all(repo.path(), &ignore_rules).unwrap();

        let store = Store::open(repo.path()).unwrap();
        let f = store.nodes_by_file("a.py").unwrap().into_iter().find(|n| n.name == "f").unwrap();
        let h = store.nodes_by_file("b.py").unwrap().into_iter().find(|n| n.name == "h").unwrap();

        let calls = store.edges_from(h.id, Some(EdgeKind::Calls)).unwrap();
        assert!(calls.iter().any(|e| e.to_id == f.id), "expected h -> f call edge to resolve across files");
    }
}

