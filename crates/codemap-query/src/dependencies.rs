//! `get_dependencies`: outgoing `imports` edges from a file's nodes,
//! categorised Internal/StdLib/ThirdParty by the resolver.

use serde::Serialize;

use codemap_core::{EdgeKind, Language, Store};
use codemap_indexer::resolver::{ModuleRegistry, Resolution};

use crate::error::{CodemapError, Result};

#[derive(Debug, Default, Serialize)]
pub struct Dependencies {
    pub internal: Vec<String>,
    pub stdlib: Vec<String>,
    pub third_party: Vec<String>,
}

pub fn get_dependencies(store: &Store, registry: &ModuleRegistry, file_path: &str) -> Result<Dependencies> {
    let nodes = store.nodes_by_file(file_path)?;
    if nodes.is_empty() {
        return Err(CodemapError::NotFound(format!("no nodes indexed for {file_path}")));
    }
    let language = Language::from_path(std::path::Path::new(file_path));

    let mut deps = Dependencies::default();
    for node in &nodes {
        for edge in store.edges_from(node.id, Some(EdgeKind::Imports))? {
            let Some(target) = store.node_by_id(edge.to_id)? else { continue };
            let import_name = if target.qualified_name == codemap_indexer::languages::MODULE_QUALIFIED_NAME {
                target.name.clone()
            } else {
                target.qualified_name.clone()
            };
            match registry.resolve(&import_name, file_path, language) {
                Resolution::Internal(path) => deps.internal.push(path),
                Resolution::StdLib => deps.stdlib.push(import_name),
                Resolution::ThirdParty => deps.third_party.push(import_name),
            }
        }
    }

    for list in [&mut deps.internal, &mut deps.stdlib, &mut deps.third_party] {
        list.sort();
        list.dedup();
    }
    Ok(deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::ignore_rules::{IgnoreRules, BUILTIN_DENY_LIST};
    use tempfile::TempDir;

    #[test]
    fn categorises_resolved_internal_imports() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("helpers.py"), "def helper():\n    pass\n").unwrap();
        std::fs::write(dir.path().join("main.py"), "from helpers import helper\n").unwrap();

        let ignore_rules = IgnoreRules::from_deny_list_and_patterns(BUILTIN_DENY_LIST, "");
        let report = codemap_indexer::driver::reindex_all(dir.path(), &ignore_rules).unwrap();
        assert_eq!(report.files_indexed, 2);

        let store = Store::open(dir.path()).unwrap();
        let registry = ModuleRegistry::build(dir.path(), &ignore_rules);

        let deps = get_dependencies(&store, &registry, "main.py").unwrap();
        assert!(deps.internal.contains(&"helpers.py".to_string()));
    }
}
