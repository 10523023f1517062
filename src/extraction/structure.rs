//! Import, class, function and literal extraction from a Python syntax tree.

use super::complexity::calculate_cyclomatic_complexity;
use super::parser::{named_children, node_line, node_text};
use crate::core::{ClassFact, FunctionFact, ImportFact, ImportKind};
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Pre-order walk over every node of the subtree
fn visit_nodes<'t>(node: Node<'t>, visitor: &mut impl FnMut(Node<'t>)) {
    visitor(node);
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    for child in children {
        visit_nodes(child, visitor);
    }
}

pub fn extract_imports(root: Node, source: &str) -> Vec<ImportFact> {
    let mut imports = Vec::new();

    visit_nodes(root, &mut |node| match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let (module, alias) = import_name(name, source);
                imports.push(ImportFact {
                    module,
                    alias,
                    kind: ImportKind::Import,
                });
            }
        }
        "import_from_statement" | "future_import_statement" => {
            let module = from_module(node, source);
            let mut cursor = node.walk();
            let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();

            if names.is_empty() && has_child_kind(node, "wildcard_import") {
                imports.push(ImportFact {
                    module: format!("{module}.*"),
                    alias: None,
                    kind: ImportKind::FromImport,
                });
            }

            for name in names {
                let (imported, alias) = import_name(name, source);
                imports.push(ImportFact {
                    module: format!("{module}.{imported}"),
                    alias,
                    kind: ImportKind::FromImport,
                });
            }
        }
        _ => {}
    });

    imports
}

fn import_name(node: Node, source: &str) -> (String, Option<String>) {
    if node.kind() == "aliased_import" {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source).to_string())
            .unwrap_or_default();
        let alias = node
            .child_by_field_name("alias")
            .map(|n| node_text(&n, source).to_string());
        (name, alias)
    } else {
        (node_text(&node, source).to_string(), None)
    }
}

/// Module a `from ... import` pulls from; relative dots are dropped.
fn from_module(node: Node, source: &str) -> String {
    if node.kind() == "future_import_statement" {
        return "__future__".to_string();
    }
    node.child_by_field_name("module_name")
        .map(|n| node_text(&n, source).trim_start_matches('.').to_string())
        .unwrap_or_default()
}

fn has_child_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

pub fn extract_classes(root: Node, source: &str) -> Vec<ClassFact> {
    let mut classes = Vec::new();

    visit_nodes(root, &mut |node| {
        if node.kind() != "class_definition" {
            return;
        }

        let name = field_text(node, "name", source).unwrap_or_default();
        let bases = node
            .child_by_field_name("superclasses")
            .map(|args| {
                named_children(&args)
                    .into_iter()
                    .filter(|arg| arg.kind() != "keyword_argument" && arg.kind() != "comment")
                    .map(|arg| expression_name(arg, source))
                    .collect()
            })
            .unwrap_or_default();
        let methods = node
            .child_by_field_name("body")
            .map(|body| {
                named_children(&body)
                    .into_iter()
                    .filter_map(as_function)
                    .filter_map(|func| field_text(func, "name", source))
                    .collect()
            })
            .unwrap_or_default();

        classes.push(ClassFact {
            name,
            methods,
            bases,
            decorators: decorators_of(node, source),
            line: node_line(&node),
        });
    });

    classes
}

/// Every function definition in the file, methods and nested functions included
pub fn extract_functions(root: Node, source: &str) -> Vec<FunctionFact> {
    let mut functions = Vec::new();

    visit_nodes(root, &mut |node| {
        if node.kind() != "function_definition" {
            return;
        }

        let params = node
            .child_by_field_name("parameters")
            .map(|params| parameter_names(params, source))
            .unwrap_or_default();

        functions.push(FunctionFact {
            name: field_text(node, "name", source).unwrap_or_default(),
            params,
            decorators: decorators_of(node, source),
            returns: field_text(node, "return_type", source),
            line: node_line(&node),
            complexity: calculate_cyclomatic_complexity(node),
            is_async: node.child(0).is_some_and(|first| first.kind() == "async"),
        });
    });

    functions
}

fn parameter_names(params: Node, source: &str) -> Vec<String> {
    named_children(&params)
        .into_iter()
        .filter_map(|param| match param.kind() {
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                Some(node_text(&param, source).to_string())
            }
            "typed_parameter" => param
                .named_child(0)
                .map(|inner| node_text(&inner, source).to_string()),
            "default_parameter" | "typed_default_parameter" => field_text(param, "name", source),
            _ => None,
        })
        .collect()
}

fn as_function(stmt: Node) -> Option<Node> {
    match stmt.kind() {
        "function_definition" => Some(stmt),
        "decorated_definition" => stmt
            .child_by_field_name("definition")
            .filter(|def| def.kind() == "function_definition"),
        _ => None,
    }
}

/// Decorator names of a definition wrapped in a `decorated_definition`
fn decorators_of(definition: Node, source: &str) -> Vec<String> {
    definition
        .parent()
        .filter(|parent| parent.kind() == "decorated_definition")
        .map(|parent| {
            named_children(&parent)
                .into_iter()
                .filter(|child| child.kind() == "decorator")
                .filter_map(|decorator| decorator.named_child(0))
                .map(|expr| expression_name(expr, source))
                .collect()
        })
        .unwrap_or_default()
}

/// Dotted name of an expression; calls resolve to their callee.
fn expression_name(node: Node, source: &str) -> String {
    match node.kind() {
        "identifier" | "attribute" | "dotted_name" => node_text(&node, source).to_string(),
        "call" => node
            .child_by_field_name("function")
            .map(|func| expression_name(func, source))
            .unwrap_or_else(|| "unknown".to_string()),
        "subscript" => node
            .child_by_field_name("value")
            .map(|value| expression_name(value, source))
            .unwrap_or_else(|| "unknown".to_string()),
        _ => "unknown".to_string(),
    }
}

fn field_text(node: Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|child| node_text(&child, source).to_string())
}

/// Literal values that look like URL paths or URLs. Interpolated f-strings
/// are skipped since their runtime value is unknown.
pub fn extract_path_literals(root: Node, source: &str) -> BTreeSet<String> {
    let mut literals = BTreeSet::new();

    visit_nodes(root, &mut |node| {
        if node.kind() != "string" || has_child_kind(node, "interpolation") {
            return;
        }
        if let Some(value) = string_value(node, source) {
            if value.starts_with('/') || value.contains("://") {
                literals.insert(value.to_string());
            }
        }
    });

    literals
}

/// Identifiers in use positions. Names bound by `def` and `class` are left
/// out so a definition alone does not count as a use.
pub fn extract_referenced_names(root: Node, source: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    visit_nodes(root, &mut |node| {
        if node.kind() != "identifier" || is_definition_name(node) {
            return;
        }
        names.insert(node_text(&node, source).to_string());
    });

    names
}

fn is_definition_name(node: Node) -> bool {
    node.parent().is_some_and(|parent| {
        matches!(parent.kind(), "function_definition" | "class_definition")
            && parent
                .child_by_field_name("name")
                .is_some_and(|name| name.id() == node.id())
    })
}

fn string_value<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    let children = {
        let mut cursor = node.walk();
        node.children(&mut cursor).collect::<Vec<_>>()
    };
    let start = children.iter().find(|c| c.kind() == "string_start")?;
    let end = children.iter().rev().find(|c| c.kind() == "string_end")?;
    source.get(start.end_byte()..end.start_byte())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::parser::parse_python;
    use indoc::indoc;
    use std::path::PathBuf;

    const SAMPLE: &str = indoc! {r#"
        import os, json as j
        from flask import Flask, jsonify
        from .models import *

        app = Flask(__name__)

        @app.route('/api/users')
        def get_users(limit: int = 10, *args, **kwargs) -> list:
            if limit and os:
                return []
            return requests.get("http://auth-service/api/auth/verify?x=1")

        @dataclass
        class UserService(BaseService, metaclass=Meta):
            def __init__(self):
                self.db = None

            @staticmethod
            async def fetch(user_id):
                return f"/users/{user_id}"
    "#};

    fn parsed() -> tree_sitter::Tree {
        parse_python(SAMPLE, &PathBuf::from("svc.py")).unwrap()
    }

    #[test]
    fn test_imports_one_entry_per_name() {
        let tree = parsed();
        let imports = extract_imports(tree.root_node(), SAMPLE);
        let modules: Vec<_> = imports.iter().map(|i| i.module.as_str()).collect();
        assert_eq!(
            modules,
            vec!["os", "json", "flask.Flask", "flask.jsonify", "models.*"]
        );
        assert_eq!(imports[1].alias.as_deref(), Some("j"));
        assert_eq!(imports[0].kind, ImportKind::Import);
        assert_eq!(imports[2].kind, ImportKind::FromImport);
    }

    #[test]
    fn test_classes_with_bases_methods_and_decorators() {
        let tree = parsed();
        let classes = extract_classes(tree.root_node(), SAMPLE);
        assert_eq!(classes.len(), 1);
        let class = &classes[0];
        assert_eq!(class.name, "UserService");
        assert_eq!(class.bases, vec!["BaseService"]);
        assert_eq!(class.methods, vec!["__init__", "fetch"]);
        assert_eq!(class.decorators, vec!["dataclass"]);
        assert_eq!(class.line, 14);
    }

    #[test]
    fn test_functions_include_methods() {
        let tree = parsed();
        let functions = extract_functions(tree.root_node(), SAMPLE);
        let names: Vec<_> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["get_users", "__init__", "fetch"]);

        let get_users = &functions[0];
        assert_eq!(get_users.params, vec!["limit", "*args", "**kwargs"]);
        assert_eq!(get_users.decorators, vec!["app.route"]);
        assert_eq!(get_users.returns.as_deref(), Some("list"));
        assert_eq!(get_users.line, 8);
        // if + `and`
        assert_eq!(get_users.complexity, 3);

        let fetch = &functions[2];
        assert!(fetch.is_async);
        assert_eq!(fetch.params, vec!["user_id"]);
        assert_eq!(fetch.decorators, vec!["staticmethod"]);
    }

    #[test]
    fn test_path_literals_skip_interpolated_strings() {
        let tree = parsed();
        let literals = extract_path_literals(tree.root_node(), SAMPLE);
        assert!(literals.contains("/api/users"));
        assert!(literals.contains("http://auth-service/api/auth/verify?x=1"));
        assert!(!literals.iter().any(|l| l.starts_with("/users/")));
    }

    #[test]
    fn test_referenced_names_exclude_definitions() {
        let source = indoc! {"
            def _helper():
                pass

            def _unused():
                pass

            class Service:
                def run(self):
                    return self._helper_two() or _helper()
        "};
        let tree = parse_python(source, &PathBuf::from("svc.py")).unwrap();
        let names = extract_referenced_names(tree.root_node(), source);
        assert!(names.contains("_helper"));
        assert!(names.contains("_helper_two"));
        assert!(names.contains("self"));
        assert!(!names.contains("_unused"));
        assert!(!names.contains("Service"));
        assert!(!names.contains("run"));
    }
}
