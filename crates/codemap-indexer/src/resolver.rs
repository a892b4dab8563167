//! Module resolver: a dotted-module-name registry built once per re-index
//! from a directory walk, used to classify an extractor's raw import
//! strings and to rewrite `imports` placeholder edges onto the real module
//! node they point at.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use codemap_core::{model::normalize_path, IgnoreRules, Language};
use ignore::WalkBuilder;

/// Where an import specifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A project file, given as its project-relative path.
    Internal(String),
    StdLib,
    ThirdParty,
}

/// Extensions tried, in order, when a specifier names a directory rather
/// than a file.
const SOURCE_EXTENSIONS: &[&str] = &["rs", "py", "ts", "tsx", "js", "jsx", "go", "java", "c", "h", "cpp", "hpp"];

/// Package-marker file names tried for a directory-shaped specifier with no
/// matching bare extension.
const INDEX_FILES: &[&str] = &["__init__.py", "mod.rs", "index.ts", "index.js"];

/// Root prefixes stripped when deriving a module's dotted name, so
/// `src/foo/bar.py` is reachable as both `src.foo.bar` and `foo.bar`.
const ROOT_PREFIXES: &[&str] = &["src", "lib"];

const PYTHON_STDLIB: &[&str] = &[
    "os", "sys", "json", "re", "typing", "collections", "itertools", "functools", "pathlib", "subprocess",
    "asyncio", "unittest", "logging", "datetime", "math", "random", "io", "abc", "enum", "dataclasses", "copy",
    "threading", "socket", "argparse", "shutil", "tempfile", "hashlib",
];
const GO_STDLIB: &[&str] = &[
    "fmt", "os", "strings", "strconv", "net", "context", "sync", "time", "errors", "io", "bytes", "encoding",
    "sort", "math", "bufio", "flag", "log", "regexp", "testing",
];
const JS_BUILTIN: &[&str] = &[
    "fs", "path", "http", "https", "crypto", "util", "events", "stream", "os", "url", "assert", "child_process",
    "net", "querystring", "buffer", "zlib",
];
const RUST_STDLIB: &[&str] = &["std", "core", "alloc"];

/// Registry of every non-ignored source file under a project root, indexed
/// both by its project-relative path and by every dotted module name it is
/// reachable under.
pub struct ModuleRegistry {
    paths: HashSet<String>,
    by_module: HashMap<String, String>,
}

impl ModuleRegistry {
    /// Walk `root`, skipping anything `ignore_rules` excludes, and build the
    /// module-name index. Run once per re-index so resolution always sees
    /// the project as it stands after the batch that triggered it.
    pub fn build(root: &Path, ignore_rules: &IgnoreRules) -> Self {
        let mut paths = HashSet::new();
        let mut by_module = HashMap::new();

        let walker = WalkBuilder::new(root).hidden(false).standard_filters(false).build();
        for entry in walker.flatten() {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else { continue };
            let rel_str = normalize_path(rel);
            if ignore_rules.is_ignored(&rel_str) {
                continue;
            }
            paths.insert(rel_str.clone());
            for name in module_names_for(&rel_str) {
                by_module.entry(name).or_insert_with(|| rel_str.clone());
            }
        }

        ModuleRegistry { paths, by_module }
    }

    /// Classify an import specifier written in `from_file`.
    pub fn resolve(&self, import: &str, from_file: &str, language: Language) -> Resolution {
        if import.is_empty() {
            return Resolution::ThirdParty;
        }
        if is_relative(import) {
            return match self.resolve_relative(import, from_file) {
                Some(path) => Resolution::Internal(path),
                None => Resolution::ThirdParty,
            };
        }

        let dotted = import.replace(['/', '\\'], ".").trim_matches('.').to_string();

        // `from pkg.helpers import helper` records the import as
        // `pkg.helpers.helper` — a symbol inside a module, not a module
        // itself — so a miss on the full string retries with trailing
        // segments dropped one at a time until a module name matches.
        let mut candidate = dotted.as_str();
        loop {
            if let Some(path) = self.lookup_module(candidate) {
                return Resolution::Internal(path);
            }
            match candidate.rsplit_once('.') {
                Some((head, _)) => candidate = head,
                None => break,
            }
        }

        if is_stdlib(&dotted, language) {
            return Resolution::StdLib;
        }
        Resolution::ThirdParty
    }

    fn lookup_module(&self, dotted: &str) -> Option<String> {
        if let Some(path) = self.by_module.get(dotted) {
            return Some(path.clone());
        }
        for prefix in ROOT_PREFIXES {
            if let Some(path) = self.by_module.get(&format!("{prefix}.{dotted}")) {
                return Some(path.clone());
            }
        }
        None
    }

    /// The module node's path for `dotted_or_path`, if it names a file this
    /// registry saw during the walk. Used by the driver to confirm an
    /// `Internal` resolution still has a node to point at.
    pub fn contains_path(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    fn resolve_relative(&self, import: &str, from_file: &str) -> Option<String> {
        let from_dir = Path::new(from_file).parent().unwrap_or_else(|| Path::new(""));

        let candidate: PathBuf = if let Some(rest) = import.strip_prefix('.') {
            if import.starts_with("./") || import.starts_with("../") {
                js_style_join(from_dir, import)
            } else {
                python_style_join(from_dir, rest, 1)
            }
        } else {
            return None;
        };

        self.find_existing(&candidate)
    }

    fn find_existing(&self, candidate: &Path) -> Option<String> {
        let base = normalize_path(candidate).trim_matches('/').to_string();
        if self.paths.contains(&base) {
            return Some(base);
        }
        for ext in SOURCE_EXTENSIONS {
            let with_ext = format!("{base}.{ext}");
            if self.paths.contains(&with_ext) {
                return Some(with_ext);
            }
        }
        for index in INDEX_FILES {
            let joined = format!("{base}/{index}");
            if self.paths.contains(&joined) {
                return Some(joined);
            }
        }
        None
    }
}

fn js_style_join(from_dir: &Path, import: &str) -> PathBuf {
    let mut dir = from_dir.to_path_buf();
    let mut rest = import;
    loop {
        if let Some(r) = rest.strip_prefix("../") {
            dir = dir.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            rest = r;
        } else if let Some(r) = rest.strip_prefix("./") {
            rest = r;
        } else {
            break;
        }
    }
    if rest.is_empty() {
        dir
    } else {
        dir.join(rest)
    }
}

/// `level` counts the leading dots already consumed by the caller (1 for
/// the first `.`); each additional dot climbs one directory up from
/// `from_dir` before the remaining dotted segments are appended.
fn python_style_join(from_dir: &Path, rest: &str, level: usize) -> PathBuf {
    let mut rest = rest;
    let mut climbs = level - 1;
    while let Some(r) = rest.strip_prefix('.') {
        climbs += 1;
        rest = r;
    }
    let mut dir = from_dir.to_path_buf();
    for _ in 0..climbs {
        dir = dir.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
    }
    if rest.is_empty() {
        dir
    } else {
        dir.join(rest.replace('.', "/"))
    }
}

fn is_relative(import: &str) -> bool {
    import.starts_with('.')
}

fn is_stdlib(dotted: &str, language: Language) -> bool {
    let head = dotted.split('.').next().unwrap_or(dotted);
    match language {
        Language::Python => PYTHON_STDLIB.contains(&head),
        Language::Go => GO_STDLIB.contains(&head),
        Language::JavaScript | Language::TypeScript => JS_BUILTIN.contains(&head),
        Language::Rust => RUST_STDLIB.contains(&head),
        _ => false,
    }
}

/// Every dotted module name a file can be imported by: its full path-derived
/// name, plus that name with a recognised root prefix stripped. A package
/// marker (`__init__.py`, `mod.rs`, `index.ts`/`index.js`) contributes its
/// parent directory's name rather than its own file stem.
fn module_names_for(rel_path: &str) -> Vec<String> {
    let path = Path::new(rel_path);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let components: Vec<String> = if matches!(stem, "__init__" | "mod" | "index") {
        parent.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect()
    } else {
        let mut comps: Vec<String> =
            parent.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
        comps.push(stem.to_string());
        comps
    };

    if components.is_empty() {
        return Vec::new();
    }

    let mut names = vec![components.join(".")];
    if let Some(first) = components.first() {
        if ROOT_PREFIXES.contains(&first.as_str()) && components.len() > 1 {
            names.push(components[1..].join("."));
        }
    }
    names
}
