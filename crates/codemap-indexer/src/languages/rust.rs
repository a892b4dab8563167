//! Rust extractor: structs, traits, impls (an impl becomes a class-like
//! container whose functions are its methods), functions; `use` becomes
//! `imports`; visibility from the `pub` keyword. Also emits intra-file
//! `calls` edges, matching the Python-like family's depth of call-edge
//! support (the distilled spec's degree-of-coverage question, resolved
//! this way since both extractors walk full function bodies already).

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use codemap_core::{Edge, EdgeKind, Language, Node, NodeId, NodeKind, Visibility};
use tree_sitter::Node as TsNode;

use super::common::{leading_comment_block, node_line_range, node_text, signature_from_node};
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};

pub struct RustExtractor {
    parser_pool: ParserPool,
}

impl RustExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

fn is_pub(item: TsNode) -> bool {
    let mut cursor = item.walk();
    item.children(&mut cursor).any(|c| c.kind() == "visibility_modifier")
}

fn visibility_of(item: TsNode) -> Visibility {
    if is_pub(item) {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

struct Ctx<'a> {
    path: &'a str,
    source: &'a [u8],
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    symbols: HashMap<String, NodeId>,
    calls: Vec<(NodeId, String, Option<u32>)>,
}

impl<'a> Ctx<'a> {
    fn defines(&mut self, parent: NodeId, child: NodeId, line: u32) {
        self.edges.push(Edge::new(parent, child, EdgeKind::Defines, Some(line)));
    }

    fn visit_items(&mut self, container: TsNode, parent: NodeId, parent_name: &str) {
        let mut cursor = container.walk();
        for item in container.children(&mut cursor) {
            self.visit_item(item, parent, parent_name);
        }
    }

    fn visit_item(&mut self, item: TsNode, parent: NodeId, parent_name: &str) {
        match item.kind() {
            "struct_item" => self.visit_struct(item, parent),
            "trait_item" => self.visit_trait(item, parent),
            "impl_item" => self.visit_impl(item, parent),
            "function_item" => self.visit_function(item, parent, parent_name, NodeKind::Function),
            "use_declaration" => self.visit_use(item, parent),
            "mod_item" => {
                if let Some(body) = item.child_by_field_name("body") {
                    self.visit_items(body, parent, parent_name);
                }
            }
            _ => {}
        }
    }

    fn visit_struct(&mut self, item: TsNode, parent: NodeId) {
        let Some(name_node) = item.child_by_field_name("name") else { return };
        let name = node_text(name_node, self.source).to_string();
        let (start, end) = node_line_range(item);
        let id = NodeId::new(self.path, &name);
        self.nodes.push(Node {
            id,
            name: name.clone(),
            qualified_name: name.clone(),
            kind: NodeKind::Struct,
            file_path: self.path.to_string(),
            start_line: start,
            end_line: end,
            signature: signature_from_node(item, self.source),
            docstring: leading_comment_block(item, self.source),
            decorators: Vec::new(),
            visibility: visibility_of(item),
            language: Some(Language::Rust),
        });
        self.symbols.insert(name, id);
        self.defines(parent, id, start);
    }

    fn visit_trait(&mut self, item: TsNode, parent: NodeId) {
        let Some(name_node) = item.child_by_field_name("name") else { return };
        let name = node_text(name_node, self.source).to_string();
        let (start, end) = node_line_range(item);
        let id = NodeId::new(self.path, &name);
        self.nodes.push(Node {
            id,
            name: name.clone(),
            qualified_name: name.clone(),
            kind: NodeKind::Trait,
            file_path: self.path.to_string(),
            start_line: start,
            end_line: end,
            signature: signature_from_node(item, self.source),
            docstring: leading_comment_block(item, self.source),
            decorators: Vec::new(),
            visibility: visibility_of(item),
            language: Some(Language::Rust),
        });
        self.symbols.insert(name.clone(), id);
        self.defines(parent, id, start);

        if let Some(body) = item.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                if member.kind() == "function_item" || member.kind() == "function_signature_item" {
                    self.visit_function(member, id, &name, NodeKind::Method);
                }
            }
        }
    }

    fn visit_impl(&mut self, item: TsNode, parent: NodeId) {
        let Some(type_node) = item.child_by_field_name("type") else { return };
        let type_name = node_text(type_node, self.source).to_string();
        let trait_node = item.child_by_field_name("trait");
        let container_name = match trait_node {
            Some(t) => format!("{} for {}", node_text(t, self.source), type_name),
            None => format!("impl {type_name}"),
        };
        let (start, end) = node_line_range(item);
        let id = NodeId::new(self.path, &container_name);

        self.nodes.push(Node {
            id,
            name: container_name.clone(),
            qualified_name: container_name.clone(),
            kind: NodeKind::Impl,
            file_path: self.path.to_string(),
            start_line: start,
            end_line: end,
            signature: signature_from_node(item, self.source),
            docstring: leading_comment_block(item, self.source),
            decorators: Vec::new(),
            visibility: Visibility::Public,
            language: Some(Language::Rust),
        });
        self.defines(parent, id, start);

        if let Some(trait_node) = trait_node {
            let trait_name = node_text(trait_node, self.source).to_string();
            let target = self
                .symbols
                .get(&trait_name)
                .copied()
                .unwrap_or_else(|| Node::placeholder(&trait_name).id);
            if !self.symbols.contains_key(&trait_name) {
                self.nodes.push(Node::placeholder(&trait_name));
            }
            self.edges.push(Edge::new(id, target, EdgeKind::Implements, Some(start)));
        }

        if let Some(body) = item.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                if member.kind() == "function_item" {
                    self.visit_function(member, id, &container_name, NodeKind::Method);
                }
            }
        }
    }

    fn visit_function(&mut self, item: TsNode, parent: NodeId, parent_name: &str, kind: NodeKind) {
        let Some(name_node) = item.child_by_field_name("name") else { return };
        let name = node_text(name_node, self.source).to_string();
        let (start, end) = node_line_range(item);
        let qualified = if kind == NodeKind::Method {
            format!("{parent_name}.{name}")
        } else {
            name.clone()
        };
        let id = NodeId::new(self.path, &qualified);

        self.nodes.push(Node {
            id,
            name: name.clone(),
            qualified_name: qualified,
            kind,
            file_path: self.path.to_string(),
            start_line: start,
            end_line: end,
            signature: signature_from_node(item, self.source),
            docstring: leading_comment_block(item, self.source),
            decorators: Vec::new(),
            visibility: visibility_of(item),
            language: Some(Language::Rust),
        });
        self.symbols.insert(name, id);
        self.defines(parent, id, start);

        if let Some(body) = item.child_by_field_name("body") {
            self.collect_calls(body, id);
        }
    }

    fn collect_calls(&mut self, node: TsNode, owner: NodeId) {
        if node.kind() == "call_expression" {
            if let Some(func) = node.child_by_field_name("function") {
                let name = match func.kind() {
                    "identifier" => Some(node_text(func, self.source).to_string()),
                    "field_expression" => func
                        .child_by_field_name("field")
                        .map(|f| node_text(f, self.source).to_string()),
                    "scoped_identifier" => func
                        .child_by_field_name("name")
                        .map(|n| node_text(n, self.source).to_string()),
                    _ => None,
                };
                if let Some(name) = name {
                    let (start, _) = node_line_range(node);
                    self.calls.push((owner, name, Some(start)));
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_calls(child, owner);
        }
    }

    fn visit_use(&mut self, item: TsNode, parent: NodeId) {
        let (start, _) = node_line_range(item);
        let mut paths = Vec::new();
        if let Some(arg) = item.child_by_field_name("argument") {
            flatten_use_tree(arg, self.source, String::new(), &mut paths);
        }
        for path in paths {
            let placeholder = Node::placeholder(&path);
            let target = placeholder.id;
            self.nodes.push(placeholder);
            self.edges.push(Edge::new(parent, target, EdgeKind::Imports, Some(start)));
        }
    }

    /// Intra-file calls resolve directly against `self.symbols`. A call whose
    /// callee isn't defined in this file still gets a `calls` edge, targeting
    /// a placeholder by bare name — the driver's cross-file resolution pass
    /// rewrites it onto the real definition if the project has one (e.g. a
    /// `use`d function), otherwise it stays a dangling external reference.
    fn resolve_calls(&mut self) {
        for (owner, name, line) in self.calls.clone() {
            if let Some(&target) = self.symbols.get(&name) {
                if target != owner {
                    self.edges.push(Edge::new(owner, target, EdgeKind::Calls, line));
                }
            } else {
                let placeholder = Node::placeholder(&name);
                let target = placeholder.id;
                self.nodes.push(placeholder);
                self.edges.push(Edge::new(owner, target, EdgeKind::Calls, line));
            }
        }
    }
}

fn flatten_use_tree(node: TsNode, source: &[u8], prefix: String, out: &mut Vec<String>) {
    match node.kind() {
        "scoped_identifier" | "scoped_use_list" => {
            let path_part = node.child_by_field_name("path").map(|p| node_text(p, source).to_string());
            let new_prefix = match (&prefix, &path_part) {
                (p, Some(part)) if p.is_empty() => part.clone(),
                (p, Some(part)) => format!("{p}::{part}"),
                _ => prefix.clone(),
            };
            if node.kind() == "scoped_identifier" {
                if let Some(name_node) = node.child_by_field_name("name") {
                    out.push(format!("{new_prefix}::{}", node_text(name_node, source)));
                } else {
                    out.push(new_prefix);
                }
            } else if let Some(list) = node.child_by_field_name("list") {
                flatten_use_tree(list, source, new_prefix, out);
            }
        }
        "use_list" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                flatten_use_tree(child, source, prefix.clone(), out);
            }
        }
        "use_as_clause" => {
            if let Some(path_node) = node.child_by_field_name("path") {
                flatten_use_tree(path_node, source, prefix, out);
            }
        }
        "identifier" | "self" | "crate" | "super" => {
            let name = node_text(node, source);
            out.push(if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}::{name}")
            });
        }
        "use_wildcard" => {
            out.push(format!("{prefix}::*"));
        }
        _ => {
            let text = node_text(node, source);
            if !text.is_empty() {
                out.push(if prefix.is_empty() {
                    text.to_string()
                } else {
                    format!("{prefix}::{text}")
                });
            }
        }
    }
}

impl LanguageExtractor for RustExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let path_str = super::path_to_str(path);

        let request = ParseRequest {
            file_type: FileType::Rust,
            content: source_code.to_string(),
            path: path.to_path_buf(),
        };
        let parse_result = self.parser_pool.parse_blocking(request)?;
        let root = parse_result.tree.root_node();

        let module_id = NodeId::new(&path_str, super::MODULE_QUALIFIED_NAME);
        let mut ctx = Ctx {
            path: &path_str,
            source: content,
            nodes: vec![Node {
                id: module_id,
                name: super::module_name_from_path(path),
                qualified_name: super::MODULE_QUALIFIED_NAME.to_string(),
                kind: NodeKind::Module,
                file_path: path_str.clone(),
                start_line: 1,
                end_line: node_line_range(root).1,
                signature: String::new(),
                docstring: leading_comment_block(root, content),
                decorators: Vec::new(),
                visibility: Visibility::Public,
                language: Some(Language::Rust),
            }],
            edges: Vec::new(),
            symbols: HashMap::new(),
            calls: Vec::new(),
        };

        ctx.visit_items(root, module_id, "");
        ctx.resolve_calls();

        Ok(ExtractionResult {
            nodes: ctx.nodes,
            edges: ctx.edges,
            diagnostics: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(code: &str) -> ExtractionResult {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = RustExtractor::new(pool);
        extractor.extract(Path::new("lib.rs"), code.as_bytes()).unwrap()
    }

    #[test]
    fn extracts_struct_and_impl_methods() {
        let code = r#"
pub struct Widget {
    pub name: String,
}

impl Widget {
    pub fn render(&self) -> String {
        self.format()
    }

    fn format(&self) -> String {
        self.name.clone()
    }
}
"#;
        let result = extract(code);
        let widget = result.nodes.iter().find(|n| n.name == "Widget" && n.kind == NodeKind::Struct).unwrap();
        assert_eq!(widget.visibility, Visibility::Public);

        let render = result
            .nodes
            .iter()
            .find(|n| n.qualified_name.ends_with(".render"))
            .unwrap();
        assert_eq!(render.kind, NodeKind::Method);

        let format_fn = result
            .nodes
            .iter()
            .find(|n| n.qualified_name.ends_with(".format"))
            .unwrap();
        assert_eq!(format_fn.visibility, Visibility::Private);

        assert!(result
            .edges
            .iter()
            .any(|e| e.from_id == render.id && e.to_id == format_fn.id && e.relation == EdgeKind::Calls));
    }

    #[test]
    fn trait_impl_creates_implements_edge() {
        let code = r#"
pub trait Shape {
    fn area(&self) -> f64;
}

struct Circle;

impl Shape for Circle {
    fn area(&self) -> f64 {
        0.0
    }
}
"#;
        let result = extract(code);
        let impl_node = result.nodes.iter().find(|n| n.kind == NodeKind::Impl).unwrap();
        assert!(result
            .edges
            .iter()
            .any(|e| e.from_id == impl_node.id && e.relation == EdgeKind::Implements));
    }

    #[test]
    fn use_declaration_produces_imports_edge() {
        let code = "use std::collections::HashMap;\n";
        let result = extract(code);
        assert!(result.edges.iter().any(|e| e.relation == EdgeKind::Imports));
        assert!(result
            .nodes
            .iter()
            .any(|n| n.qualified_name == "std::collections::HashMap"));
    }
}
