//! C# extractor: classes, structs, interfaces, enums (recursing through
//! `namespace_declaration` bodies), methods, constructors, heritage and
//! `using` directives. No intra-file `calls` edges — same degree of support
//! as the rest of the C family and Go.
//!
//! C#'s grammar puts both the base class and implemented interfaces in one
//! unlabelled `base_list`, unlike Java's separate `superclass`/`interfaces`
//! fields, so there is no syntactic way to tell them apart. This follows the
//! same convention the language itself encourages: a base-list entry named
//! `I` + an uppercase letter (`IDisposable`, `IEnumerable<T>`) is treated as
//! an interface, everything else as a base class.

use std::path::Path;

use anyhow::Result;
use codemap_core::{Edge, EdgeKind, Language, Node, NodeId, NodeKind, Visibility};
use tree_sitter::Node as TsNode;

use super::common::{leading_comment_block, node_line_range, node_text, signature_from_node};
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};

pub struct CSharpExtractor {
    parser_pool: ParserPool,
}

impl CSharpExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for CSharpExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let path_str = super::path_to_str(path);

        let request = ParseRequest {
            file_type: FileType::CSharp,
            content: source_code.to_string(),
            path: path.to_path_buf(),
        };
        let parse_result = self.parser_pool.parse_blocking(request)?;
        let root = parse_result.tree.root_node();

        let module_id = NodeId::new(&path_str, super::MODULE_QUALIFIED_NAME);
        let mut nodes = vec![Node {
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
            language: Some(Language::CSharp),
        }];
        let mut edges = Vec::new();

        let mut cursor = root.walk();
        for item in root.children(&mut cursor) {
            visit_top_level(item, &path_str, content, module_id, &mut nodes, &mut edges);
        }

        Ok(ExtractionResult {
            nodes,
            edges,
            diagnostics: Vec::new(),
        })
    }
}

fn visit_top_level(
    item: TsNode,
    path: &str,
    source: &[u8],
    parent_id: NodeId,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    match item.kind() {
        "class_declaration" => extract_type(item, path, source, parent_id, NodeKind::Class, nodes, edges),
        "struct_declaration" => extract_type(item, path, source, parent_id, NodeKind::Struct, nodes, edges),
        "interface_declaration" => extract_type(item, path, source, parent_id, NodeKind::Interface, nodes, edges),
        "enum_declaration" => extract_enum(item, path, source, parent_id, nodes, edges),
        "using_directive" => extract_using(item, source, parent_id, nodes, edges),
        "namespace_declaration" | "file_scoped_namespace_declaration" => {
            if let Some(body) = item.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    visit_top_level(child, path, source, parent_id, nodes, edges);
                }
            } else {
                let mut cursor = item.walk();
                for child in item.children(&mut cursor) {
                    visit_top_level(child, path, source, parent_id, nodes, edges);
                }
            }
        }
        _ => {}
    }
}

fn modifiers_visibility(item: TsNode, source: &[u8]) -> Visibility {
    let mut cursor = item.walk();
    for child in item.children(&mut cursor) {
        if child.kind() != "modifier" {
            continue;
        }
        match node_text(child, source) {
            "public" => return Visibility::Public,
            "private" => return Visibility::Private,
            "protected" | "internal" => return Visibility::Protected,
            _ => {}
        }
    }
    // C# class members default to `private`; top-level types default to
    // `internal`. Either way "not explicitly public" is the closer fit.
    Visibility::Private
}

fn extract_type(
    item: TsNode,
    path: &str,
    source: &[u8],
    parent_id: NodeId,
    kind: NodeKind,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(name_node) = item.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let (start, end) = node_line_range(item);
    let id = NodeId::new(path, &name);

    nodes.push(Node {
        id,
        name: name.clone(),
        qualified_name: name.clone(),
        kind,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(item, source),
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: modifiers_visibility(item, source),
        language: Some(Language::CSharp),
    });
    edges.push(Edge::new(parent_id, id, EdgeKind::Defines, Some(start)));

    if let Some(base_list) = find_child_by_kind(item, "base_list") {
        for base_name in base_list_identifiers(base_list, source) {
            let relation = if looks_like_interface_name(&base_name) {
                EdgeKind::Implements
            } else {
                EdgeKind::Inherits
            };
            let placeholder = Node::placeholder(&base_name);
            let target = placeholder.id;
            nodes.push(placeholder);
            edges.push(Edge::new(id, target, relation, Some(start)));
        }
    }

    if let Some(body) = item.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "method_declaration" | "constructor_declaration" | "property_declaration" => {
                    extract_method(member, path, source, &name, id, nodes, edges)
                }
                "class_declaration" => extract_type(member, path, source, id, NodeKind::Class, nodes, edges),
                "struct_declaration" => extract_type(member, path, source, id, NodeKind::Struct, nodes, edges),
                "interface_declaration" => extract_type(member, path, source, id, NodeKind::Interface, nodes, edges),
                _ => {}
            }
        }
    }
}

fn extract_enum(
    item: TsNode,
    path: &str,
    source: &[u8],
    parent_id: NodeId,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(name_node) = item.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let (start, end) = node_line_range(item);
    let id = NodeId::new(path, &name);

    nodes.push(Node {
        id,
        name: name.clone(),
        qualified_name: name,
        kind: NodeKind::Struct,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(item, source),
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: modifiers_visibility(item, source),
        language: Some(Language::CSharp),
    });
    edges.push(Edge::new(parent_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_method(
    item: TsNode,
    path: &str,
    source: &[u8],
    type_name: &str,
    type_id: NodeId,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(name_node) = item.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let (start, end) = node_line_range(item);
    let qualified = format!("{type_name}.{name}");
    let id = NodeId::new(path, &qualified);

    nodes.push(Node {
        id,
        name,
        qualified_name: qualified,
        kind: NodeKind::Method,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(item, source),
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: modifiers_visibility(item, source),
        language: Some(Language::CSharp),
    });
    edges.push(Edge::new(type_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_using(item: TsNode, source: &[u8], module_id: NodeId, nodes: &mut Vec<Node>, edges: &mut Vec<Edge>) {
    let (start, _) = node_line_range(item);
    let mut cursor = item.walk();
    for child in item.children(&mut cursor) {
        if matches!(child.kind(), "qualified_name" | "identifier") {
            let imported = node_text(child, source).to_string();
            let placeholder = Node::placeholder(&imported);
            let target = placeholder.id;
            nodes.push(placeholder);
            edges.push(Edge::new(module_id, target, EdgeKind::Imports, Some(start)));
            return;
        }
    }
}

fn find_child_by_kind<'a>(node: TsNode<'a>, kind: &str) -> Option<TsNode<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|child| child.kind() == kind)
}

fn base_list_identifiers(node: TsNode, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "identifier" | "qualified_name" => names.push(node_text(child, source).to_string()),
            "generic_name" => {
                if let Some(base) = child.child(0) {
                    names.push(node_text(base, source).to_string());
                }
            }
            _ => {}
        }
    }
    names
}

fn looks_like_interface_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!((chars.next(), chars.next()), (Some('I'), Some(c)) if c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::NodeKind;

    #[test]
    fn extracts_class_with_interface_and_methods() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = CSharpExtractor::new(pool);
        let code = r#"
using System;

namespace Animals
{
    public class Dog : IDisposable
    {
        public Dog() {}

        public void Speak() {}

        public void Dispose() {}
    }
}
"#;
        let result = extractor.extract(Path::new("Dog.cs"), code.as_bytes()).unwrap();

        let dog = result.nodes.iter().find(|n| n.name == "Dog" && n.kind == NodeKind::Class).unwrap();
        assert!(result.edges.iter().any(|e| e.from_id == dog.id && e.relation == EdgeKind::Implements));
        assert!(result.nodes.iter().any(|n| n.qualified_name == "Dog.Speak"));
        assert!(result.edges.iter().any(|e| e.relation == EdgeKind::Imports));
    }

    #[test]
    fn base_class_without_interface_naming_is_inherits() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = CSharpExtractor::new(pool);
        let code = r#"
public class Labrador : Dog
{
}
"#;
        let result = extractor.extract(Path::new("Labrador.cs"), code.as_bytes()).unwrap();
        let labrador = result.nodes.iter().find(|n| n.name == "Labrador").unwrap();
        assert!(result.edges.iter().any(|e| e.from_id == labrador.id && e.relation == EdgeKind::Inherits));
    }

    #[test]
    fn extracts_struct_and_enum_declarations() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = CSharpExtractor::new(pool);
        let code = r#"
public struct Point
{
    public int X;
}

public enum Color
{
    Red,
    Blue,
}
"#;
        let result = extractor.extract(Path::new("Shapes.cs"), code.as_bytes()).unwrap();
        assert!(result.nodes.iter().any(|n| n.name == "Point" && n.kind == NodeKind::Struct));
        assert!(result.nodes.iter().any(|n| n.name == "Color" && n.kind == NodeKind::Struct));
    }
}
