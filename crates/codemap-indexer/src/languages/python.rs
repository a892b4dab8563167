//! Python extractor: classes, functions, methods, module-scope variables;
//! `import`/`from ... import` become `imports` edges; decorators captured;
//! visibility from leading underscore; docstring is the leading string
//! literal of a class/function body; intra-file `calls` edges for direct
//! call expressions whose callee matches another symbol in the same file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use codemap_core::{Edge, EdgeKind, Language, Node, NodeId, NodeKind, Visibility};
use tree_sitter::Node as TsNode;

use super::common::{
    leading_comment_block, leading_string_docstring, node_line_range, node_text,
    signature_from_node, visibility_from_leading_underscore,
};
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};

pub struct PythonExtractor {
    parser_pool: ParserPool,
}

impl PythonExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
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

fn decorator_texts(decorated: TsNode, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = decorated.walk();
    for child in decorated.children(&mut cursor) {
        if child.kind() == "decorator" {
            out.push(node_text(child, source).trim_start_matches('@').trim().to_string());
        }
    }
    out
}

fn fn_name(def: TsNode, source: &[u8]) -> Option<String> {
    def.child_by_field_name("name").map(|n| node_text(n, source).to_string())
}

impl<'a> Ctx<'a> {
    fn add_defines(&mut self, parent: NodeId, child: NodeId, line: Option<u32>) {
        self.edges.push(Edge::new(parent, child, EdgeKind::Defines, line));
    }

    fn visit_block(&mut self, block: TsNode, parent: NodeId, parent_name: &str, in_class: bool) {
        let mut cursor = block.walk();
        for child in block.children(&mut cursor) {
            self.visit_statement(child, parent, parent_name, in_class);
        }
    }

    fn visit_statement(&mut self, stmt: TsNode, parent: NodeId, parent_name: &str, in_class: bool) {
        let (def, decorators) = match stmt.kind() {
            "decorated_definition" => {
                let inner = stmt
                    .children(&mut stmt.walk())
                    .find(|c| c.kind() == "function_definition" || c.kind() == "class_definition");
                match inner {
                    Some(inner) => (inner, decorator_texts(stmt, self.source)),
                    None => return,
                }
            }
            "function_definition" | "class_definition" => (stmt, Vec::new()),
            _ => {
                self.collect_imports(stmt, parent);
                self.collect_variable(stmt, parent, parent_name);
                self.collect_calls_in(stmt, parent);
                return;
            }
        };

        let Some(name) = fn_name(def, self.source) else { return };
        let (start, end) = node_line_range(def);
        let qualified = if parent_name.is_empty() {
            name.clone()
        } else {
            format!("{parent_name}.{name}")
        };
        let docstring = def
            .child_by_field_name("body")
            .map(|b| leading_string_docstring(b, self.source))
            .unwrap_or_default();
        let signature = def
            .child_by_field_name("parameters")
            .map(|p| format!("{}{}", name, node_text(p, self.source)))
            .unwrap_or_else(|| name.clone());

        match def.kind() {
            "class_definition" => {
                let id = NodeId::new(self.path, &qualified);
                self.nodes.push(Node {
                    id,
                    name: name.clone(),
                    qualified_name: qualified.clone(),
                    kind: NodeKind::Class,
                    file_path: self.path.to_string(),
                    start_line: start,
                    end_line: end,
                    signature: signature_from_node(def, self.source),
                    docstring,
                    decorators,
                    visibility: visibility_from_leading_underscore(&name),
                    language: Some(Language::Python),
                });
                self.symbols.insert(name.clone(), id);
                self.add_defines(parent, id, Some(start));
                if let Some(body) = def.child_by_field_name("body") {
                    self.visit_block(body, id, &qualified, true);
                }
            }
            "function_definition" => {
                let id = NodeId::new(self.path, &qualified);
                let kind = if in_class { NodeKind::Method } else { NodeKind::Function };
                self.nodes.push(Node {
                    id,
                    name: name.clone(),
                    qualified_name: qualified.clone(),
                    kind,
                    file_path: self.path.to_string(),
                    start_line: start,
                    end_line: end,
                    signature,
                    docstring,
                    decorators,
                    visibility: visibility_from_leading_underscore(&name),
                    language: Some(Language::Python),
                });
                self.symbols.insert(name.clone(), id);
                self.add_defines(parent, id, Some(start));
                if let Some(body) = def.child_by_field_name("body") {
                    self.collect_calls_in(body, id);
                }
            }
            _ => {}
        }
    }

    /// Module- or class-scope `name = ...` / `name: T = ...` assignment,
    /// the only shape the grammar exposes simply enough to name reliably
    /// (tuple/attribute/subscript targets are left unextracted).
    fn collect_variable(&mut self, stmt: TsNode, parent: NodeId, parent_name: &str) {
        if stmt.kind() != "expression_statement" {
            return;
        }
        let mut cursor = stmt.walk();
        let Some(assignment) = stmt.children(&mut cursor).find(|c| c.kind() == "assignment") else {
            return;
        };
        let Some(left) = assignment.child_by_field_name("left") else { return };
        if left.kind() != "identifier" {
            return;
        }
        let name = node_text(left, self.source).to_string();
        let (start, end) = node_line_range(stmt);
        let qualified = if parent_name.is_empty() { name.clone() } else { format!("{parent_name}.{name}") };
        let id = NodeId::new(self.path, &qualified);
        self.nodes.push(Node {
            id,
            name: name.clone(),
            qualified_name: qualified,
            kind: NodeKind::Variable,
            file_path: self.path.to_string(),
            start_line: start,
            end_line: end,
            signature: signature_from_node(stmt, self.source),
            docstring: String::new(),
            decorators: Vec::new(),
            visibility: visibility_from_leading_underscore(&name),
            language: Some(Language::Python),
        });
        self.symbols.insert(name, id);
        self.add_defines(parent, id, Some(start));
    }

    fn collect_imports(&mut self, stmt: TsNode, module_id: NodeId) {
        let (start, _) = node_line_range(stmt);
        match stmt.kind() {
            "import_statement" => {
                let mut cursor = stmt.walk();
                for child in stmt.children(&mut cursor) {
                    if child.kind() == "dotted_name" {
                        let module = node_text(child, self.source).to_string();
                        let placeholder = Node::placeholder(&module);
                        let target = placeholder.id;
                        self.nodes.push(placeholder);
                        self.edges
                            .push(Edge::new(module_id, target, EdgeKind::Imports, Some(start)));
                    }
                }
            }
            "import_from_statement" => {
                let module = stmt
                    .child_by_field_name("module_name")
                    .map(|n| node_text(n, self.source).to_string());
                let Some(module) = module else { return };
                let mut cursor = stmt.walk();
                let mut any_name = false;
                for child in stmt.children(&mut cursor) {
                    if child.kind() == "dotted_name" || child.kind() == "identifier" {
                        let symbol = node_text(child, self.source);
                        if symbol == module {
                            continue;
                        }
                        any_name = true;
                        let qualified = format!("{module}.{symbol}");
                        let placeholder = Node::placeholder(&qualified);
                        let target = placeholder.id;
                        self.nodes.push(placeholder);
                        self.edges
                            .push(Edge::new(module_id, target, EdgeKind::Imports, Some(start)));
                    }
                }
                if !any_name {
                    let placeholder = Node::placeholder(&module);
                    let target = placeholder.id;
                    self.nodes.push(placeholder);
                    self.edges
                        .push(Edge::new(module_id, target, EdgeKind::Imports, Some(start)));
                }
            }
            _ => {}
        }
    }

    fn collect_calls_in(&mut self, node: TsNode, owner: NodeId) {
        if node.kind() == "call" {
            if let Some(func) = node.child_by_field_name("function") {
                let name = match func.kind() {
                    "identifier" => Some(node_text(func, self.source).to_string()),
                    "attribute" => func
                        .child_by_field_name("attribute")
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
            self.collect_calls_in(child, owner);
        }
    }

    /// Intra-file calls resolve directly against `self.symbols`. A call whose
    /// callee isn't defined in this file still gets a `calls` edge, targeting
    /// a placeholder by bare name — the driver's cross-file resolution pass
    /// rewrites it onto the real definition if the project has one (e.g. an
    /// imported function), otherwise it stays a dangling external reference.
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

impl LanguageExtractor for PythonExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let path_str = super::path_to_str(path);

        let request = ParseRequest {
            file_type: FileType::Python,
            content: source_code.to_string(),
            path: path.to_path_buf(),
        };
        let parse_result = self.parser_pool.parse_blocking(request)?;
        let tree = parse_result.tree;
        let root = tree.root_node();

        let module_docstring = leading_string_docstring(root, content);
        let module_id = NodeId::new(&path_str, super::MODULE_QUALIFIED_NAME);
        let module_comment = leading_comment_block(root, content);

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
                docstring: if module_docstring.is_empty() {
                    module_comment
                } else {
                    module_docstring
                },
                decorators: Vec::new(),
                visibility: Visibility::Public,
                language: Some(Language::Python),
            }],
            edges: Vec::new(),
            symbols: HashMap::new(),
            calls: Vec::new(),
        };

        ctx.visit_block(root, module_id, "", false);
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
        let extractor = PythonExtractor::new(pool);
        extractor.extract(Path::new("sample.py"), code.as_bytes()).unwrap()
    }

    #[test]
    fn extracts_class_and_methods_with_defines_edges() {
        let code = r#"
class Widget:
    """A widget."""

    def render(self):
        return self._draw()

    def _draw(self):
        pass
"#;
        let result = extract(code);
        let class = result.nodes.iter().find(|n| n.name == "Widget").unwrap();
        assert_eq!(class.kind, NodeKind::Class);
        assert_eq!(class.docstring, "A widget.");

        let render = result.nodes.iter().find(|n| n.qualified_name == "Widget.render").unwrap();
        assert_eq!(render.kind, NodeKind::Method);
        assert_eq!(render.visibility, Visibility::Public);

        let draw = result.nodes.iter().find(|n| n.qualified_name == "Widget._draw").unwrap();
        assert_eq!(draw.visibility, Visibility::Private);

        assert!(result
            .edges
            .iter()
            .any(|e| e.from_id == class.id && e.to_id == render.id && e.relation == EdgeKind::Defines));
        assert!(result
            .edges
            .iter()
            .any(|e| e.from_id == render.id && e.to_id == draw.id && e.relation == EdgeKind::Calls));
    }

    #[test]
    fn extracts_module_scope_variables() {
        let code = "API_VERSION = 2\n_cache = {}\n\n\ndef f():\n    local = 1\n    return local\n";
        let result = extract(code);

        let version = result.nodes.iter().find(|n| n.name == "API_VERSION").unwrap();
        assert_eq!(version.kind, NodeKind::Variable);
        assert_eq!(version.visibility, Visibility::Public);

        let cache = result.nodes.iter().find(|n| n.name == "_cache").unwrap();
        assert_eq!(cache.kind, NodeKind::Variable);
        assert_eq!(cache.visibility, Visibility::Private);

        // Assignments inside a function body are locals, not module-scope
        // variables, and must not be extracted as nodes.
        assert!(!result.nodes.iter().any(|n| n.name == "local"));

        let module = result.nodes.iter().find(|n| n.qualified_name == super::super::MODULE_QUALIFIED_NAME).unwrap();
        assert!(result
            .edges
            .iter()
            .any(|e| e.from_id == module.id && e.to_id == version.id && e.relation == EdgeKind::Defines));
    }

    #[test]
    fn extracts_decorators() {
        let code = "@staticmethod\ndef helper():\n    pass\n";
        let result = extract(code);
        let helper = result.nodes.iter().find(|n| n.name == "helper").unwrap();
        assert_eq!(helper.decorators, vec!["staticmethod".to_string()]);
    }

    #[test]
    fn import_creates_placeholder_and_edge() {
        let code = "import os\nfrom collections import OrderedDict\n";
        let result = extract(code);
        let imports: Vec<_> = result.edges.iter().filter(|e| e.relation == EdgeKind::Imports).collect();
        assert_eq!(imports.len(), 2);
        assert!(result.nodes.iter().any(|n| n.qualified_name == "os"));
        assert!(result.nodes.iter().any(|n| n.qualified_name == "collections.OrderedDict"));
    }
}
