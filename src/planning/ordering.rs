//! Dependency ordering of plan steps
//!
//! An edge `dep -> step` is added for every literal dependency naming an
//! existing step, and for a wildcard `prefix*` from every other step whose id
//! starts with `prefix`. Unknown literal ids are ignored.

use crate::core::{wildcard_prefix, RefactorStep};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use tracing::warn;

/// Step dependency graph. Node `i` is the `i`-th step of the slice it was
/// built from.
pub struct StepGraph {
    graph: DiGraph<String, ()>,
}

impl StepGraph {
    pub fn build(steps: &[RefactorStep]) -> Self {
        let mut graph = DiGraph::with_capacity(steps.len(), steps.len());
        let mut index_of: HashMap<&str, NodeIndex> = HashMap::new();
        let nodes: Vec<NodeIndex> = steps
            .iter()
            .map(|step| {
                let node = graph.add_node(step.id.clone());
                index_of.entry(step.id.as_str()).or_insert(node);
                node
            })
            .collect();

        for (position, step) in steps.iter().enumerate() {
            let node = nodes[position];
            for dependency in &step.dependencies {
                match wildcard_prefix(dependency) {
                    Some(prefix) => {
                        for (other_position, other) in steps.iter().enumerate() {
                            if other_position != position && other.id.starts_with(prefix) {
                                graph.update_edge(nodes[other_position], node, ());
                            }
                        }
                    }
                    None => {
                        if let Some(&dep_node) = index_of.get(dependency.as_str()) {
                            if dep_node != node {
                                graph.update_edge(dep_node, node, ());
                            }
                        }
                    }
                }
            }
        }

        Self { graph }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn successors(&self, node: NodeIndex) -> BTreeSet<NodeIndex> {
        self.graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect()
    }

    fn in_degree(&self, node: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .count()
    }

    /// Kahn's algorithm, always releasing the ready step that comes first in
    /// the input order. `None` when the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|node| self.in_degree(node))
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(position, _)| Reverse(position))
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(Reverse(position)) = ready.pop() {
            order.push(position);
            for next in self.successors(NodeIndex::new(position)) {
                let degree = &mut in_degree[next.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(next.index()));
                }
            }
        }

        (order.len() == self.len()).then_some(order)
    }

    /// Simple paths of at least two steps from a source (no incoming edges)
    /// to a sink (no outgoing edges), longest first, at most `limit`. Equal
    /// lengths keep discovery order.
    pub fn critical_paths(&self, limit: usize) -> Vec<Vec<String>> {
        let mut paths: Vec<Vec<NodeIndex>> = Vec::new();

        for source in self.graph.node_indices() {
            if self.in_degree(source) != 0 {
                continue;
            }
            let mut path = vec![source];
            let mut on_path = BTreeSet::from([source]);
            self.walk_paths(source, &mut path, &mut on_path, &mut paths);
        }

        paths.sort_by_key(|path| Reverse(path.len()));
        paths.truncate(limit);
        paths
            .into_iter()
            .map(|path| path.into_iter().map(|n| self.graph[n].clone()).collect())
            .collect()
    }

    fn walk_paths(
        &self,
        current: NodeIndex,
        path: &mut Vec<NodeIndex>,
        on_path: &mut BTreeSet<NodeIndex>,
        paths: &mut Vec<Vec<NodeIndex>>,
    ) {
        let successors = self.successors(current);
        if successors.is_empty() {
            if path.len() >= 2 {
                paths.push(path.clone());
            }
            return;
        }
        for next in successors {
            if on_path.insert(next) {
                path.push(next);
                self.walk_paths(next, path, on_path, paths);
                path.pop();
                on_path.remove(&next);
            }
        }
    }
}

/// Steps in dependency order, or in their given order plus a cycle flag
/// when no such order exists.
pub struct OrderedSteps {
    pub steps: Vec<RefactorStep>,
    pub dependency_cycle: bool,
}

pub fn order_by_dependencies(steps: Vec<RefactorStep>) -> OrderedSteps {
    let graph = StepGraph::build(&steps);

    match graph.topological_order() {
        Some(order) => {
            let mut slots: Vec<Option<RefactorStep>> = steps.into_iter().map(Some).collect();
            let steps = order
                .into_iter()
                .filter_map(|position| slots[position].take())
                .collect();
            OrderedSteps {
                steps,
                dependency_cycle: false,
            }
        }
        None => {
            warn!(
                "Plan steps have cyclic dependencies; keeping generation order without dependency ordering"
            );
            OrderedSteps {
                steps,
                dependency_cycle: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RefactorType, RiskLevel};

    fn step(id: &str, deps: &[&str]) -> RefactorStep {
        RefactorStep {
            id: id.into(),
            step_type: RefactorType::Restructure,
            description: id.into(),
            target_files: vec![],
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            estimated_effort: 1,
            risk_level: RiskLevel::Low,
            rollback_strategy: None,
            validation_steps: vec![],
            commit_message: None,
        }
    }

    fn ids(steps: &[RefactorStep]) -> Vec<&str> {
        steps.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_wildcard_dependencies_order_after_all_matches() {
        let steps = vec![
            step("implement-event-sourcing", &["async-*"]),
            step("async-a-b", &["setup-message-broker"]),
            step("setup-message-broker", &[]),
            step("async-c-d", &["setup-message-broker"]),
        ];
        let ordered = order_by_dependencies(steps);
        assert!(!ordered.dependency_cycle);
        assert_eq!(
            ids(&ordered.steps),
            vec![
                "setup-message-broker",
                "async-a-b",
                "async-c-d",
                "implement-event-sourcing"
            ]
        );
    }

    #[test]
    fn test_independent_steps_keep_input_order() {
        let steps = vec![step("c", &[]), step("a", &[]), step("b", &["missing"])];
        let ordered = order_by_dependencies(steps);
        assert_eq!(ids(&ordered.steps), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_cycle_keeps_original_order_and_flags() {
        let steps = vec![step("a", &["b"]), step("b", &["a"]), step("c", &[])];
        let ordered = order_by_dependencies(steps);
        assert!(ordered.dependency_cycle);
        assert_eq!(ids(&ordered.steps), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_wildcard_does_not_match_itself() {
        let steps = vec![step("async-a", &["async-*"]), step("async-b", &[])];
        let ordered = order_by_dependencies(steps);
        assert!(!ordered.dependency_cycle);
        assert_eq!(ids(&ordered.steps), vec!["async-b", "async-a"]);
    }

    #[test]
    fn test_critical_paths_longest_first() {
        let steps = vec![
            step("root", &[]),
            step("mid", &["root"]),
            step("leaf", &["mid"]),
            step("side", &["root"]),
            step("alone", &[]),
        ];
        let graph = StepGraph::build(&steps);
        let paths = graph.critical_paths(3);
        assert_eq!(
            paths,
            vec![
                vec!["root".to_string(), "mid".to_string(), "leaf".to_string()],
                vec!["root".to_string(), "side".to_string()],
            ]
        );
    }
}
