use tree_sitter::Node;

/// Cyclomatic complexity of a subtree:
/// `1 + conditionals + loops + exception handlers + (boolean operands - 1)`.
///
/// Tree-sitter nests `a and b and c` as two binary `boolean_operator` nodes,
/// so counting one per node gives the same total as counting operands minus
/// one per flattened boolean expression. `elif` clauses count as conditionals.
pub fn calculate_cyclomatic_complexity(node: Node) -> u32 {
    let mut complexity = 1;
    visit_node_for_complexity(node, &mut complexity);
    complexity
}

fn visit_node_for_complexity(node: Node, complexity: &mut u32) {
    if is_decision_point(node.kind()) {
        *complexity += 1;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_node_for_complexity(child, complexity);
    }
}

fn is_decision_point(kind: &str) -> bool {
    matches!(
        kind,
        "if_statement"
            | "elif_clause"
            | "for_statement"
            | "while_statement"
            | "except_clause"
            | "except_group_clause"
            | "boolean_operator"
    )
}
