//! End-to-end scenarios exercising the indexing driver and query engine
//! together against real (temp-directory) projects, rather than the
//! hand-built stores used by each crate's unit tests.

use std::fs;

use tempfile::TempDir;

use codemap_core::ignore_rules::IgnoreRules;
use codemap_core::Store;
use codemap_indexer::driver::{reindex_all, reindex_path};
use codemap_indexer::resolver::ModuleRegistry;
use codemap_query::callstack::{get_call_stack, Direction};
use codemap_query::dependencies::get_dependencies;
use codemap_query::error::ErrorCode;
use codemap_query::impact::impact_analysis;
use codemap_query::search::search_by_signature;
use codemap_query::summary::get_structural_summary;

fn write_project(dir: &TempDir, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
    }
}

fn open_rules(dir: &TempDir) -> IgnoreRules {
    IgnoreRules::load(dir.path())
}

#[test]
fn two_file_python_project_links_call_stack_impact_and_dependencies() {
    let dir = TempDir::new().unwrap();
    write_project(
        &dir,
        &[
            ("a.py", "def f():\n    g()\n\n\ndef g():\n    pass\n"),
            ("b.py", "from a import f\n\n\ndef h():\n    f()\n"),
        ],
    );
    let ignore_rules = open_rules(&dir);
    let report = reindex_all(dir.path(), &ignore_rules).unwrap();
    assert_eq!(report.files_indexed, 2);

    let store = Store::open(dir.path()).unwrap();

    let summary = get_structural_summary(&store, "a.py", 100, 0).unwrap();
    let functions: Vec<_> = summary.nodes.iter().filter(|n| n.name == "f").collect();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].visibility, codemap_core::Visibility::Public);

    let call_stack = get_call_stack(&store, "f", None, Direction::Up, 2).unwrap();
    let hits: Vec<_> = call_stack.origins.iter().flat_map(|o| &o.hits).collect();
    assert!(hits.iter().any(|hit| hit.node.name == "h" && hit.node.file_path == "b.py"));

    let impact = impact_analysis(&store, "a.py").unwrap();
    assert!(impact[0]
        .files
        .iter()
        .any(|group| group.file_path == "b.py" && group.nodes.iter().any(|n| n.name == "h")));

    let registry = ModuleRegistry::build(dir.path(), &ignore_rules);
    let deps = get_dependencies(&store, &registry, "b.py").unwrap();
    assert!(deps.internal.contains(&"a.py".to_string()));
}

#[test]
fn mutually_calling_functions_terminate_with_a_cycle_marker() {
    let dir = TempDir::new().unwrap();
    write_project(
        &dir,
        &[
            ("x.py", "from y import b\n\n\ndef a():\n    b()\n"),
            ("y.py", "from x import a\n\n\ndef b():\n    a()\n"),
        ],
    );
    let ignore_rules = open_rules(&dir);
    reindex_all(dir.path(), &ignore_rules).unwrap();

    let store = Store::open(dir.path()).unwrap();
    let result = get_call_stack(&store, "a", None, Direction::Down, 5).unwrap();
    let hits: Vec<_> = result.origins.iter().flat_map(|o| &o.hits).collect();

    assert!(hits.iter().any(|hit| hit.node.name == "b" && !hit.cycle));
    assert!(hits.iter().any(|hit| hit.node.name == "a" && hit.cycle));
}

#[test]
fn renaming_a_symbol_and_reindexing_drops_the_old_name() {
    let dir = TempDir::new().unwrap();
    write_project(
        &dir,
        &[
            ("a.py", "def f():\n    pass\n"),
            ("b.py", "from a import f\n\n\ndef h():\n    f()\n"),
        ],
    );
    let ignore_rules = open_rules(&dir);
    reindex_all(dir.path(), &ignore_rules).unwrap();

    fs::write(dir.path().join("a.py"), "def ff():\n    pass\n").unwrap();
    reindex_path(dir.path(), std::path::Path::new("a.py")).unwrap();

    let store = Store::open(dir.path()).unwrap();

    let missing = get_call_stack(&store, "f", None, Direction::Up, 1).unwrap_err();
    assert_eq!(missing.code(), ErrorCode::NotFound);

    let renamed = get_call_stack(&store, "ff", None, Direction::Up, 2).unwrap();
    let hits: Vec<_> = renamed.origins.iter().flat_map(|o| &o.hits).collect();
    assert!(hits.iter().any(|hit| hit.node.name == "h"));
}

#[test]
fn ignored_directories_never_produce_nodes() {
    let dir = TempDir::new().unwrap();
    write_project(
        &dir,
        &[
            ("main.py", "def entry():\n    pass\n"),
            ("dist/bundled.py", "def bundled():\n    pass\n"),
            (".codemapignore", "dist/\n"),
        ],
    );
    let ignore_rules = open_rules(&dir);
    reindex_all(dir.path(), &ignore_rules).unwrap();

    let store = Store::open(dir.path()).unwrap();
    assert!(store.all_nodes().unwrap().iter().all(|n| !n.file_path.starts_with("dist/")));
}

#[test]
fn transitive_impact_is_capped_at_three_levels() {
    let dir = TempDir::new().unwrap();
    write_project(
        &dir,
        &[
            ("a.py", "def a():\n    pass\n"),
            ("b.py", "from a import a\n\n\ndef b():\n    a()\n"),
            ("c.py", "from b import b\n\n\ndef c():\n    b()\n"),
            ("d.py", "from c import c\n\n\ndef d():\n    c()\n"),
            ("e.py", "from d import d\n\n\ndef e():\n    d()\n"),
        ],
    );
    let ignore_rules = open_rules(&dir);
    reindex_all(dir.path(), &ignore_rules).unwrap();

    let store = Store::open(dir.path()).unwrap();
    let levels = impact_analysis(&store, "a.py").unwrap();

    assert_eq!(levels.len(), 3);
    assert_eq!(levels[0].files[0].file_path, "b.py");
    assert_eq!(levels[1].files[0].file_path, "c.py");
    assert_eq!(levels[2].files[0].file_path, "d.py");
    assert!(!levels.iter().any(|l| l.files.iter().any(|f| f.file_path == "e.py")));
}

#[test]
fn signature_search_ranks_an_exact_match_first() {
    let dir = TempDir::new().unwrap();
    write_project(
        &dir,
        &[(
            "store.py",
            "class Store:\n    def upsert_node(self, node):\n        pass\n",
        )],
    );
    let ignore_rules = open_rules(&dir);
    reindex_all(dir.path(), &ignore_rules).unwrap();

    let store = Store::open(dir.path()).unwrap();

    let wildcard = search_by_signature(&store, "%node%", None).unwrap();
    assert!(wildcard.iter().any(|hit| hit.node.name == "upsert_node"));

    let exact = search_by_signature(&store, "upsert_node(self, node)", None).unwrap();
    assert_eq!(exact[0].node.name, "upsert_node");
    assert_eq!(exact[0].rank, codemap_query::search::MatchRank::Exact);
}
