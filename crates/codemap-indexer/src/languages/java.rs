//! Java extractor: classes, interfaces, methods, constructors, `extends`/
//! `implements` heritage and `import` declarations. No intra-file `calls`
//! edges — same degree of support as the C family and Go.

use std::path::Path;

use anyhow::Result;
use codemap_core::{Edge, EdgeKind, Language, Node, NodeId, NodeKind, Visibility};
use tree_sitter::Node as TsNode;

use super::common::{leading_comment_block, node_line_range, node_text, signature_from_node};
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};

pub struct JavaExtractor {
    parser_pool: ParserPool,
}

impl JavaExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for JavaExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let path_str = super::path_to_str(path);

        let request = ParseRequest {
            file_type: FileType::Java,
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
            language: Some(Language::Java),
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
    module_id: NodeId,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    match item.kind() {
        "class_declaration" => extract_type(item, path, source, module_id, NodeKind::Class, nodes, edges),
        "interface_declaration" => extract_type(item, path, source, module_id, NodeKind::Interface, nodes, edges),
        "import_declaration" => extract_import(item, source, module_id, nodes, edges),
        _ => {
            let mut cursor = item.walk();
            for child in item.children(&mut cursor) {
                if matches!(child.kind(), "class_declaration" | "interface_declaration" | "import_declaration") {
                    visit_top_level(child, path, source, module_id, nodes, edges);
                }
            }
        }
    }
}

/// Java's package-private default has no equivalent `Visibility` variant;
/// anything lacking an explicit modifier falls back to `Private` as the
/// closer approximation of "not part of the public API".
fn modifiers_visibility(item: TsNode, source: &[u8]) -> Visibility {
    let Some(modifiers) = item.child_by_field_name("modifiers") else { return Visibility::Private };
    let mut cursor = modifiers.walk();
    for child in modifiers.children(&mut cursor) {
        match node_text(child, source) {
            "public" => return Visibility::Public,
            "private" => return Visibility::Private,
            "protected" => return Visibility::Protected,
            _ => {}
        }
    }
    Visibility::Private
}

fn extract_type(
    item: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
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
        language: Some(Language::Java),
    });
    edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));

    if let Some(superclass) = item.child_by_field_name("superclass") {
        for base_name in type_identifiers(superclass, source) {
            let placeholder = Node::placeholder(&base_name);
            let target = placeholder.id;
            nodes.push(placeholder);
            edges.push(Edge::new(id, target, EdgeKind::Inherits, Some(start)));
        }
    }

    if let Some(interfaces) = item.child_by_field_name("interfaces") {
        for iface_name in type_identifiers(interfaces, source) {
            let placeholder = Node::placeholder(&iface_name);
            let target = placeholder.id;
            nodes.push(placeholder);
            edges.push(Edge::new(id, target, EdgeKind::Implements, Some(start)));
        }
    }

    if let Some(body) = item.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "method_declaration" => extract_method(member, path, source, &name, id, NodeKind::Method, nodes, edges),
                "constructor_declaration" => {
                    extract_method(member, path, source, &name, id, NodeKind::Method, nodes, edges)
                }
                _ => {}
            }
        }
    }
}

fn type_identifiers(node: TsNode, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "type_identifier" | "scoped_type_identifier" => names.push(node_text(child, source).to_string()),
            "generic_type" => {
                if let Some(base) = child.child(0) {
                    names.push(node_text(base, source).to_string());
                }
            }
            _ => names.extend(type_identifiers(child, source)),
        }
    }
    names
}

fn extract_method(
    item: TsNode,
    path: &str,
    source: &[u8],
    type_name: &str,
    type_id: NodeId,
    kind: NodeKind,
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
        kind,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(item, source),
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: modifiers_visibility(item, source),
        language: Some(Language::Java),
    });
    edges.push(Edge::new(type_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_import(item: TsNode, source: &[u8], module_id: NodeId, nodes: &mut Vec<Node>, edges: &mut Vec<Edge>) {
    let (start, _) = node_line_range(item);
    let mut cursor = item.walk();
    for child in item.children(&mut cursor) {
        if matches!(child.kind(), "scoped_identifier" | "identifier") {
            let imported = node_text(child, source).to_string();
            let placeholder = Node::placeholder(&imported);
            let target = placeholder.id;
            nodes.push(placeholder);
            edges.push(Edge::new(module_id, target, EdgeKind::Imports, Some(start)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_core::NodeKind;

    #[test]
    fn extracts_class_with_interface_and_methods() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = JavaExtractor::new(pool);
        let code = r#"
import java.util.List;

public class Dog implements Animal {
    public Dog() {}

    public void speak() {}
}
"#;
        let result = extractor.extract(Path::new("Dog.java"), code.as_bytes()).unwrap();

        let dog = result.nodes.iter().find(|n| n.name == "Dog" && n.kind == NodeKind::Class).unwrap();
        assert!(result.edges.iter().any(|e| e.from_id == dog.id && e.relation == EdgeKind::Implements));
        assert!(result.nodes.iter().any(|n| n.qualified_name == "Dog.speak"));
        assert!(result.edges.iter().any(|e| e.relation == EdgeKind::Imports));
    }

    #[test]
    fn extracts_interface_declaration() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = JavaExtractor::new(pool);
        let code = r#"
interface Shape {
    double area();
}
"#;
        let result = extractor.extract(Path::new("Shape.java"), code.as_bytes()).unwrap();
        assert!(result.nodes.iter().any(|n| n.name == "Shape" && n.kind == NodeKind::Interface));
    }
}
