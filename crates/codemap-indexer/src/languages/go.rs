//! Go extractor: structs, interfaces, top-level funcs, methods (receiver
//! becomes the parent via a synthesized `defines` edge); `import` becomes
//! `imports`; visibility from a leading-uppercase identifier. No intra-file
//! `calls` edges, matching this family's degree of call-edge support.

use std::path::Path;

use anyhow::Result;
use codemap_core::{Edge, EdgeKind, Language, Node, NodeId, NodeKind, Visibility};
use tree_sitter::Node as TsNode;

use super::common::{
    leading_comment_block, node_line_range, node_text, signature_from_node, visibility_from_leading_case,
};
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};

pub struct GoExtractor {
    parser_pool: ParserPool,
}

impl GoExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

fn receiver_type_name(receiver: TsNode, source: &[u8]) -> Option<String> {
    let mut cursor = receiver.walk();
    for param in receiver.children(&mut cursor) {
        if param.kind() != "parameter_declaration" {
            continue;
        }
        if let Some(ty) = param.child_by_field_name("type") {
            let name = match ty.kind() {
                "pointer_type" => ty.named_child(0).map(|n| node_text(n, source).to_string()),
                _ => Some(node_text(ty, source).to_string()),
            };
            return name;
        }
    }
    None
}

fn visit_type_declaration(
    item: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    symbols: &mut std::collections::HashMap<String, NodeId>,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let mut cursor = item.walk();
    for spec in item.children(&mut cursor) {
        if spec.kind() != "type_spec" {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else { continue };
        let name = node_text(name_node, source).to_string();
        let Some(type_node) = spec.child_by_field_name("type") else { continue };
        let kind = match type_node.kind() {
            "struct_type" => NodeKind::Struct,
            "interface_type" => NodeKind::Interface,
            _ => continue,
        };
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
            signature: signature_from_node(spec, source),
            docstring: leading_comment_block(item, source),
            decorators: Vec::new(),
            visibility: visibility_from_leading_case(&name),
            language: Some(Language::Go),
        });
        symbols.insert(name, id);
        edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));
    }
}

fn visit_function_declaration(
    item: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
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
        kind: NodeKind::Function,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(item, source),
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: visibility_from_leading_case(&name),
        language: Some(Language::Go),
    });
    edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));
}

fn visit_method_declaration(
    item: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    symbols: &std::collections::HashMap<String, NodeId>,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(name_node) = item.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let Some(receiver) = item.child_by_field_name("receiver") else { return };
    let Some(receiver_type) = receiver_type_name(receiver, source) else { return };
    let (start, end) = node_line_range(item);
    let qualified = format!("{receiver_type}.{name}");
    let id = NodeId::new(path, &qualified);

    nodes.push(Node {
        id,
        name: name.clone(),
        qualified_name: qualified,
        kind: NodeKind::Method,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(item, source),
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: visibility_from_leading_case(&name),
        language: Some(Language::Go),
    });

    let parent = symbols.get(&receiver_type).copied().unwrap_or(module_id);
    edges.push(Edge::new(parent, id, EdgeKind::Defines, Some(start)));
}

fn visit_import_declaration(
    item: TsNode,
    source: &[u8],
    module_id: NodeId,
    edges: &mut Vec<Edge>,
    nodes: &mut Vec<Node>,
) {
    let (start, _) = node_line_range(item);
    let mut specs = Vec::new();
    collect_import_specs(item, &mut specs);
    for spec in specs {
        if let Some(path_node) = spec.child_by_field_name("path") {
            let import_path = node_text(path_node, source).trim_matches('"').to_string();
            let placeholder = Node::placeholder(&import_path);
            let target = placeholder.id;
            nodes.push(placeholder);
            edges.push(Edge::new(module_id, target, EdgeKind::Imports, Some(start)));
        }
    }
}

fn collect_import_specs<'a>(node: TsNode<'a>, out: &mut Vec<TsNode<'a>>) {
    if node.kind() == "import_spec" {
        out.push(node);
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_import_specs(child, out);
    }
}

impl LanguageExtractor for GoExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let path_str = super::path_to_str(path);

        let request = ParseRequest {
            file_type: FileType::Go,
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
            language: Some(Language::Go),
        }];
        let mut edges = Vec::new();
        let mut symbols = std::collections::HashMap::new();

        let mut cursor = root.walk();
        let children: Vec<_> = root.children(&mut cursor).collect();
        for item in &children {
            if item.kind() == "type_declaration" {
                visit_type_declaration(*item, &path_str, content, module_id, &mut symbols, &mut nodes, &mut edges);
            }
        }
        for item in &children {
            match item.kind() {
                "function_declaration" => {
                    visit_function_declaration(*item, &path_str, content, module_id, &mut nodes, &mut edges)
                }
                "method_declaration" => {
                    visit_method_declaration(*item, &path_str, content, module_id, &symbols, &mut nodes, &mut edges)
                }
                "import_declaration" => visit_import_declaration(*item, content, module_id, &mut edges, &mut nodes),
                _ => {}
            }
        }

        Ok(ExtractionResult {
            nodes,
            edges,
            diagnostics: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(code: &str) -> ExtractionResult {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = GoExtractor::new(pool);
        extractor.extract(Path::new("main.go"), code.as_bytes()).unwrap()
    }

    #[test]
    fn extracts_struct_and_method_with_receiver() {
        let code = r#"
package main

import "fmt"

type Widget struct {
	Name string
}

func (w *Widget) Render() string {
	return w.Name
}

func helper() {
	fmt.Println("hi")
}
"#;
        let result = extract(code);
        let widget = result.nodes.iter().find(|n| n.name == "Widget").unwrap();
        assert_eq!(widget.kind, NodeKind::Struct);
        assert_eq!(widget.visibility, Visibility::Public);

        let render = result.nodes.iter().find(|n| n.qualified_name == "Widget.Render").unwrap();
        assert!(result
            .edges
            .iter()
            .any(|e| e.from_id == widget.id && e.to_id == render.id && e.relation == EdgeKind::Defines));

        let helper = result.nodes.iter().find(|n| n.name == "helper").unwrap();
        assert_eq!(helper.visibility, Visibility::Private);

        assert!(result.edges.iter().any(|e| e.relation == EdgeKind::Imports));
    }
}
