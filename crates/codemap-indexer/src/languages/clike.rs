//! Shared extraction logic for the C-family: functions, structs, enums,
//! typedefs; C++ additionally gets classes and their methods. `#include`
//! becomes `imports`. No visibility modifiers in plain C, so everything is
//! `public`; C++ `private:`/`protected:` access sections are not tracked
//! (the grammar exposes them as sibling markers, not a per-member field).
//! No intra-file `calls` edges, matching this family's degree of
//! call-edge support.

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
    for item in root.children(&mut cursor) {
        visit_top_level(item, &path_str, content, module_id, language, &mut nodes, &mut edges);
    }

    Ok(ExtractionResult {
        nodes,
        edges,
        diagnostics: Vec::new(),
    })
}

fn visit_top_level(
    item: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    match item.kind() {
        "function_definition" => extract_function(item, path, source, module_id, language, nodes, edges),
        "struct_specifier" => extract_record(item, path, source, module_id, language, NodeKind::Struct, nodes, edges),
        "class_specifier" => extract_class(item, path, source, module_id, language, nodes, edges),
        "enum_specifier" => extract_record(item, path, source, module_id, language, NodeKind::Struct, nodes, edges),
        "type_definition" => extract_typedef(item, path, source, module_id, language, nodes, edges),
        "preproc_include" => extract_include(item, source, module_id, nodes, edges),
        _ => {
            let mut cursor = item.walk();
            for child in item.children(&mut cursor) {
                if matches!(
                    child.kind(),
                    "function_definition" | "struct_specifier" | "class_specifier" | "enum_specifier"
                ) {
                    visit_top_level(child, path, source, module_id, language, nodes, edges);
                }
            }
        }
    }
}

fn function_name(declarator: TsNode, source: &[u8]) -> Option<String> {
    match declarator.kind() {
        "function_declarator" => declarator
            .child_by_field_name("declarator")
            .and_then(|d| function_name(d, source)),
        "pointer_declarator" => declarator
            .child_by_field_name("declarator")
            .and_then(|d| function_name(d, source)),
        "identifier" | "field_identifier" => Some(node_text(declarator, source).to_string()),
        "qualified_identifier" => declarator
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string()),
        _ => None,
    }
}

fn extract_function(
    item: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(declarator) = item.child_by_field_name("declarator") else { return };
    let Some(name) = function_name(declarator, source) else { return };
    let (start, end) = node_line_range(item);
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
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: Visibility::Public,
        language: Some(language),
    });
    edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_record(
    item: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
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
        qualified_name: name,
        kind,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(item, source),
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: Visibility::Public,
        language: Some(language),
    });
    edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_class(
    item: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
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
        kind: NodeKind::Class,
        file_path: path.to_string(),
        start_line: start,
        end_line: end,
        signature: signature_from_node(item, source),
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: Visibility::Public,
        language: Some(language),
    });
    edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));

    if let Some(base_clause) = item.child_by_field_name("base_class_clause") {
        let mut cursor = base_clause.walk();
        for base in base_clause.children(&mut cursor) {
            if base.kind() == "type_identifier" || base.kind() == "qualified_identifier" {
                let base_name = node_text(base, source).to_string();
                let placeholder = Node::placeholder(&base_name);
                let target = placeholder.id;
                nodes.push(placeholder);
                edges.push(Edge::new(id, target, EdgeKind::Inherits, Some(start)));
            }
        }
    }

    if let Some(body) = item.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            if member.kind() == "function_definition" {
                extract_method(member, path, source, &name, id, language, nodes, edges);
            }
        }
    }
}

fn extract_method(
    item: TsNode,
    path: &str,
    source: &[u8],
    class_name: &str,
    class_id: NodeId,
    language: Language,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let Some(declarator) = item.child_by_field_name("declarator") else { return };
    let Some(name) = function_name(declarator, source) else { return };
    let (start, end) = node_line_range(item);
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
        signature: signature_from_node(declarator, source),
        docstring: leading_comment_block(item, source),
        decorators: Vec::new(),
        visibility: Visibility::Public,
        language: Some(language),
    });
    edges.push(Edge::new(class_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_typedef(
    item: TsNode,
    path: &str,
    source: &[u8],
    module_id: NodeId,
    language: Language,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) {
    let mut cursor = item.walk();
    let Some(name_node) = item.children(&mut cursor).find(|c| c.kind() == "type_identifier") else { return };
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
        visibility: Visibility::Public,
        language: Some(language),
    });
    edges.push(Edge::new(module_id, id, EdgeKind::Defines, Some(start)));
}

fn extract_include(item: TsNode, source: &[u8], module_id: NodeId, nodes: &mut Vec<Node>, edges: &mut Vec<Edge>) {
    let (start, _) = node_line_range(item);
    let mut cursor = item.walk();
    for child in item.children(&mut cursor) {
        if child.kind() == "string_literal" || child.kind() == "system_lib_string" {
            let header = node_text(child, source)
                .trim_matches('"')
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string();
            let placeholder = Node::placeholder(&header);
            let target = placeholder.id;
            nodes.push(placeholder);
            edges.push(Edge::new(module_id, target, EdgeKind::Imports, Some(start)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::create_parser_pool;

    #[test]
    fn extracts_c_struct_function_and_include() {
        let code = r#"
#include <stdio.h>

struct Point {
    int x;
    int y;
};

int add(int a, int b) {
    return a + b;
}
"#;
        let pool = create_parser_pool();
        let result = extract(&pool, Path::new("main.c"), code.as_bytes(), FileType::C, Language::C).unwrap();

        assert!(result.nodes.iter().any(|n| n.name == "Point" && n.kind == NodeKind::Struct));
        assert!(result.nodes.iter().any(|n| n.name == "add" && n.kind == NodeKind::Function));
        assert!(result.edges.iter().any(|e| e.relation == EdgeKind::Imports));
    }

    #[test]
    fn extracts_cpp_class_with_base_and_method() {
        let code = r#"
class Animal {
public:
    void speak();
};

class Dog : public Animal {
public:
    void speak() {}
};
"#;
        let pool = create_parser_pool();
        let result = extract(&pool, Path::new("animal.cpp"), code.as_bytes(), FileType::Cpp, Language::Cpp).unwrap();

        let dog = result.nodes.iter().find(|n| n.name == "Dog" && n.kind == NodeKind::Class).unwrap();
        assert!(result.edges.iter().any(|e| e.from_id == dog.id && e.relation == EdgeKind::Inherits));
        assert!(result.nodes.iter().any(|n| n.qualified_name == "Dog.speak"));
    }
}
