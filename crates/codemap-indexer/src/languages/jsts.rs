//! Shared extraction logic for the JS/TS-like family: classes, functions,
//! arrow-bound top-level consts, interfaces (TypeScript only);
//! `extends`/`implements` become `inherits`/`implements`; decorators
//! captured where present; visibility `exported` for exported items, else
//! `private`. No intra-file `calls` edges — matching the degree of
//! call-edge support this family has across the corpus.

use std::path::Path;

use anyhow::Result;
use codemap_core::{Edge, EdgeKind, Language, Node, NodeId, NodeKind, Visibility};
use tree_sitter::Node as TsNode;

use super::common::{leading_comment_block, node_line_range, node_text, signature_from_node};
use super::ExtractionResult;
use crate::parser_pool::{FileType, ParseRequest, ParserPool};

pub fn extract(
    parser_pool: &ParserPool,
    path: &Path,
    content: &[u8],
    file_type: FileType,
    language: Language,
) -> Result<ExtractionResult> {
    let source_code = std::str::from_utf8(content)?;
    let path_str = super::path_to_str(path);

    let request = ParseRequest {
        file_type,
        content: source_code.to_string(),
        path: path.to_path_buf(),
    };
    let parse_result = parser_pool.parse_blocking(request)?;
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
        language: Some(language),
    }];
    let mut edges = Vec::new();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        visit_top_level(child, &path_str, content, module_id, language, &mut nodes, &mut edges);
    }

    Ok(ExtractionResult {
        nodes,
        edges,
        diagnostics: Vec::new(),
    })
}

fn is_exported(stmt: TsNode) -> bool {
    stmt.kind() == "export_statement"
}

fn decorators_of(node: TsNode, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "decorator" {
            out.push(node_text(child, source).trim_start_matches('@').trim().to_string());
        }
    }
    out
}

fn visit_top_level(
    stmt: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let exported = is_exported(stmt);
    let decl = if exported {
        stmt.children(&mut stmt.walk())
            .find(|c| !c.kind().starts_with("export") && c.kind() != "default" && c.is_named())
            .unwrap_or(stmt)
    } else {
        stmt
    };

    match decl.kind() {
        "class_declaration" => extract_class(decl, path, source, module_id, language, exported, nodes, edges),
        "interface_declaration" => {
            extract_interface(decl, path, source, module_id, language, exported, nodes, edges)
        }
        "function_declaration" => extract_function(decl, path, source, module_id, language, exported, nodes, edges),
        "lexical_declaration" | "variable_declaration" => {
            extract_arrow_consts(decl, path, source, module_id, language, exported, nodes, edges)
        }
        _ => {}
    }
}

fn extract_class(
    node: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
    exported: bool,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let (start, end) = node_line_range(node);
    let id = NodeId::new(path, &name);

    nodes.push(Node {
        id,
        name: name.clone(),
        qualified_name: name.clone(),
        kind: NodeKind::Class,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(node, source),
        docstring: leading_comment_block(node, source),
        decorators: decorators_of(node, source),
        visibility: if exported { Visibility::Exported } else { Visibility::Private },
        language: Some(language),
    });
    edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));

    if let Some(heritage) = node.child_by_field_name("heritage") {
        extract_heritage(heritage, source, id, nodes, edges);
    } else {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "class_heritage" {
                extract_heritage(child, source, id, nodes, edges);
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            if member.kind() == "method_definition" {
                extract_method(member, path, source, name.as_str(), id, language, nodes, edges);
            }
        }
    }
}

fn extract_heritage(
    heritage: TsNode,
    source: &[u8],
    class_id: NodeId,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let mut cursor = heritage.walk();
    for clause in heritage.children(&mut cursor) {
        let relation = match clause.kind() {
            "extends_clause" => EdgeKind::Inherits,
            "implements_clause" => EdgeKind::Implements,
            _ => continue,
        };
        let mut inner = clause.walk();
        for target in clause.children(&mut inner) {
            if target.kind() == "identifier" || target.kind() == "type_identifier" {
                let name = node_text(target, source).to_string();
                let placeholder = Node::placeholder(&name);
                let target_id = placeholder.id;
                edges.push(Edge::new(class_id, target_id, relation, None));
                nodes.push(placeholder);
            }
        }
    }
}

fn extract_interface(
    node: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
    exported: bool,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let (start, end) = node_line_range(node);
    let id = NodeId::new(path, &name);

    nodes.push(Node {
        id,
        name: name.clone(),
        qualified_name: name,
        kind: NodeKind::Interface,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(node, source),
        docstring: leading_comment_block(node, source),
        decorators: Vec::new(),
        visibility: if exported { Visibility::Exported } else { Visibility::Private },
        language: Some(language),
    });
    edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_function(
    node: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
    exported: bool,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let (start, end) = node_line_range(node);
    let id = NodeId::new(path, &name);

    nodes.push(Node {
        id,
        name: name.clone(),
        qualified_name: name,
        kind: NodeKind::Function,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(node, source),
        docstring: leading_comment_block(node, source),
        decorators: Vec::new(),
        visibility: if exported { Visibility::Exported } else { Visibility::Private },
        language: Some(language),
    });
    edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_method(
    node: TsNode,
    path: &str,
    source: &[u8],
    class_name: &str,
    class_id: NodeId,
    language: Language,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let (start, end) = node_line_range(node);
    let qualified = format!("{class_name}.{name}");
    let id = NodeId::new(path, &qualified);

    nodes.push(Node {
        id,
        name,
        qualified_name: qualified,
        kind: NodeKind::Method,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(node, source),
        docstring: leading_comment_block(node, source),
        decorators: decorators_of(node, source),
        visibility: Visibility::Public,
        language: Some(language),
    });
    edges.push(Edge::new(class_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_arrow_consts(
    node: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
    exported: bool,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let mut cursor = node.walk();
    for declarator in node.children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else { continue };
        let Some(value) = declarator.child_by_field_name("value") else { continue };
        if value.kind() != "arrow_function" && value.kind() != "function" && value.kind() != "function_expression" {
            continue;
        }
        let name = node_text(name_node, source).to_string();
        let (start, end) = node_line_range(declarator);
        let id = NodeId::new(path, &name);

        nodes.push(Node {
            id,
            name: name.clone(),
            qualified_name: name,
            kind: NodeKind::Function,
            file_path: path.to_string(),
            start_line: start,
            end_line: end,
            signature: signature_from_node(declarator, source),
            docstring: leading_comment_block(node, source),
            decorators: Vec::new(),
            visibility: if exported { Visibility::Exported } else { Visibility::Private },
            language: Some(language),
        });
        edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));
    }
}
