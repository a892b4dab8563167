//! Shared ignore-rule matching, used by both the indexing driver and the
//! change watcher so a file excluded from one is excluded from the other.
//!
//! Two layers: a built-in deny-list of directories that are never project
//! source, plus an optional project `.codemapignore` file (one pattern per
//! line, `#` comments, trailing `/` for directory-only entries, `*` glob).

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Directories that are never indexed, regardless of `.codemapignore`.
pub const BUILTIN_DENY_LIST: &[&str] = &[
    ".git",
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    "dist",
    "build",
    "target",
    crate::store::STORE_DIR,
];

/// Name of the project-local ignore file, read from the project root.
pub const IGNORE_FILE_NAME: &str = ".codemapignore";

pub struct IgnoreRules {
    deny_dirs: Vec<String>,
    patterns: GlobSet,
}

impl IgnoreRules {
    /// Build the ruleset for a project root: the built-in deny-list plus
    /// whatever `.codemapignore` at the root contains, if present.
    pub fn load(root: &Path) -> Self {
        let custom = std::fs::read_to_string(root.join(IGNORE_FILE_NAME)).unwrap_or_default();
        Self::from_deny_list_and_patterns(BUILTIN_DENY_LIST, &custom)
    }

    /// Build a ruleset directly from a deny-list and ignore-file contents;
    /// exposed so tests and the watcher can construct a ruleset without
    /// touching the filesystem.
    pub fn from_deny_list_and_patterns(deny_dirs: &[&str], ignore_file_contents: &str) -> Self {
        let mut builder = GlobSetBuilder::new();
        for line in ignore_file_contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let pattern = line.trim_end_matches('/');
            if let Ok(glob) = Glob::new(pattern) {
                builder.add(glob);
            }
            // Directory-only patterns also match everything beneath them.
            if let Ok(glob) = Glob::new(&format!("{pattern}/**")) {
                builder.add(glob);
            }
        }
        let patterns = builder.build().unwrap_or_else(|_| GlobSet::empty());
        IgnoreRules {
            deny_dirs: deny_dirs.iter().map(|s| s.to_string()).collect(),
            patterns,
        }
    }

    /// `true` if a project-relative, forward-slash path should be skipped.
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        let normalized = relative_path.trim_start_matches("./");
        if normalized
            .split('/')
            .any(|segment| self.deny_dirs.iter().any(|d| d == segment))
        {
            return true;
        }
        self.patterns.is_match(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_deny_list_matches_any_depth() {
        let rules = IgnoreRules::from_deny_list_and_patterns(BUILTIN_DENY_LIST, "");
        assert!(rules.is_ignored("node_modules/lodash/index.js"));
        assert!(rules.is_ignored("pkg/.venv/lib/x.py"));
        assert!(!rules.is_ignored("src/lib.rs"));
    }

    #[test]
    fn custom_ignore_file_glob_patterns() {
        let rules = IgnoreRules::from_deny_list_and_patterns(&[], "*.generated.ts\nvendor/");
        assert!(rules.is_ignored("src/api.generated.ts"));
        assert!(rules.is_ignored("vendor/lib.go"));
        assert!(!rules.is_ignored("src/api.ts"));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let rules = IgnoreRules::from_deny_list_and_patterns(&[], "# comment\n\n*.log");
        assert!(rules.is_ignored("debug.log"));
        assert!(!rules.is_ignored("# comment"));
    }
}
