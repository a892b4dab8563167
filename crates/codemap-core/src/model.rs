//! Core data structures for the code graph.

use std::path::Path;

use serde::{Deserialize, Serialize};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over raw bytes. Fixed seed, no per-process salt — unlike
/// `std::hash::DefaultHasher`, the same input always produces the same
/// output on every machine and every run.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Project-relative, forward-slash separated form of a path, used both for
/// the `Node::file_path` field and as hashing input.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Stable identifier for a node: `fnv1a(normalized_path + "::" + qualified_name)`.
///
/// `(file_path, qualified_name)` uniquely determines this value, so the
/// store can upsert by primary key without coordinating sequence numbers
/// and a single-file re-index never needs a global ID rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn new(file_path: &str, qualified_name: &str) -> Self {
        let mut buf = Vec::with_capacity(file_path.len() + qualified_name.len() + 2);
        buf.extend_from_slice(file_path.as_bytes());
        buf.extend_from_slice(b"::");
        buf.extend_from_slice(qualified_name.as_bytes());
        NodeId(fnv1a(&buf))
    }

    pub fn as_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

/// Stable identifier for an edge: `fnv1a(from_id || to_id || relation)`.
///
/// Two edges extracted from the same triple collapse to the same ID, which
/// is how `upsert_edge` recognises a duplicate `(from_id, to_id, relation)`
/// without a separate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(from_id: NodeId, to_id: NodeId, relation: EdgeKind) -> Self {
        let mut buf = Vec::with_capacity(17);
        buf.extend_from_slice(&from_id.0.to_le_bytes());
        buf.extend_from_slice(&to_id.0.to_le_bytes());
        buf.push(relation as u8);
        EdgeId(fnv1a(&buf))
    }

    pub fn as_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

/// Discriminates what kind of code entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Trait,
    Impl,
    Module,
    Variable,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Function => "function",
            NodeKind::Method => "method",
            NodeKind::Class => "class",
            NodeKind::Struct => "struct",
            NodeKind::Interface => "interface",
            NodeKind::Trait => "trait",
            NodeKind::Impl => "impl",
            NodeKind::Module => "module",
            NodeKind::Variable => "variable",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "function" => NodeKind::Function,
            "method" => NodeKind::Method,
            "class" => NodeKind::Class,
            "struct" => NodeKind::Struct,
            "interface" => NodeKind::Interface,
            "trait" => NodeKind::Trait,
            "impl" => NodeKind::Impl,
            "module" => NodeKind::Module,
            "variable" => NodeKind::Variable,
            _ => return None,
        })
    }
}

/// Inferred access level of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Exported,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Exported => "exported",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "public" => Visibility::Public,
            "private" => Visibility::Private,
            "protected" => Visibility::Protected,
            "exported" => Visibility::Exported,
            _ => return None,
        })
    }
}

/// Diagnostic-only language tag. Never load-bearing for any invariant or
/// query result; kept so extractors and tests can assert "this node came
/// from the Python extractor" without re-deriving it from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Other,
}

impl Language {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("rs") => Language::Rust,
            Some("py") | Some("pyi") => Language::Python,
            Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => Language::JavaScript,
            Some("ts") | Some("tsx") => Language::TypeScript,
            Some("go") => Language::Go,
            Some("java") => Language::Java,
            Some("c") | Some("h") => Language::C,
            Some("cpp") | Some("cc") | Some("cxx") | Some("hpp") | Some("hh") => Language::Cpp,
            Some("cs") => Language::CSharp,
            _ => Language::Other,
        }
    }
}

/// A definable entity in source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub qualified_name: String,
    pub kind: NodeKind,
    /// Project-relative, forward-slash separated. `"<external>"` for placeholders.
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub signature: String,
    pub docstring: String,
    pub decorators: Vec<String>,
    pub visibility: Visibility,
    /// Diagnostic-only; see [`Language`].
    pub language: Option<Language>,
}

impl Node {
    pub const EXTERNAL_FILE: &'static str = "<external>";

    /// A placeholder node for a forward reference, external package, or
    /// unresolved import — representable in an edge before the real
    /// definition (if any) has been seen.
    pub fn placeholder(qualified_name: &str) -> Self {
        Node {
            id: NodeId::new(Self::EXTERNAL_FILE, qualified_name),
            name: qualified_name
                .rsplit(&['.', ':'][..])
                .next()
                .unwrap_or(qualified_name)
                .to_string(),
            qualified_name: qualified_name.to_string(),
            kind: NodeKind::Module,
            file_path: Self::EXTERNAL_FILE.to_string(),
            start_line: 0,
            end_line: 0,
            signature: String::new(),
            docstring: String::new(),
            decorators: Vec::new(),
            visibility: Visibility::Public,
            language: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.file_path == Self::EXTERNAL_FILE
    }
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EdgeKind {
    Defines = 0,
    Calls = 1,
    Inherits = 2,
    Implements = 3,
    Imports = 4,
    References = 5,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Defines => "defines",
            EdgeKind::Calls => "calls",
            EdgeKind::Inherits => "inherits",
            EdgeKind::Implements => "implements",
            EdgeKind::Imports => "imports",
            EdgeKind::References => "references",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "defines" => EdgeKind::Defines,
            "calls" => EdgeKind::Calls,
            "inherits" => EdgeKind::Inherits,
            "implements" => EdgeKind::Implements,
            "imports" => EdgeKind::Imports,
            "references" => EdgeKind::References,
            _ => return None,
        })
    }
}

/// A directed relation between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub from_id: NodeId,
    pub to_id: NodeId,
    pub relation: EdgeKind,
    pub site_line: Option<u32>,
}

impl Edge {
    pub fn new(from_id: NodeId, to_id: NodeId, relation: EdgeKind, site_line: Option<u32>) -> Self {
        Edge {
            from_id,
            to_id,
            relation,
            site_line,
        }
    }

    pub fn id(&self) -> EdgeId {
        EdgeId::new(self.from_id, self.to_id, self.relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_is_deterministic() {
        let a = NodeId::new("src/lib.rs", "Foo.bar");
        let b = NodeId::new("src/lib.rs", "Foo.bar");
        assert_eq!(a, b);
    }

    #[test]
    fn node_id_distinguishes_file_and_name() {
        let a = NodeId::new("src/lib.rs", "Foo.bar");
        let b = NodeId::new("src/other.rs", "Foo.bar");
        let c = NodeId::new("src/lib.rs", "Foo.baz");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn edge_id_depends_on_relation() {
        let a = NodeId::new("src/lib.rs", "Foo");
        let b = NodeId::new("src/lib.rs", "Bar");
        let calls = EdgeId::new(a, b, EdgeKind::Calls);
        let references = EdgeId::new(a, b, EdgeKind::References);
        assert_ne!(calls, references);
    }

    #[test]
    fn placeholder_node_uses_external_marker() {
        let node = Node::placeholder("some.external.Thing");
        assert!(node.is_placeholder());
        assert_eq!(node.name, "Thing");
    }

    #[test]
    fn normalize_path_uses_forward_slashes() {
        let p = std::path::Path::new("src\\pkg\\mod.rs");
        assert_eq!(normalize_path(p), "src/pkg/mod.rs");
    }
}
