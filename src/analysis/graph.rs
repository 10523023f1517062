//! Service dependency graph
//!
//! Nodes are all analyzed services, including ones with no edges, so degree
//! centrality is normalized over the whole architecture. Parallel
//! `ServiceDependency` records between the same pair collapse into one graph
//! edge.

use super::profile::ServiceScan;
use crate::core::{DependencyKind, ServiceDependency};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet};

pub struct ServiceGraph {
    graph: DiGraph<String, f64>,
    node_map: BTreeMap<String, NodeIndex>,
}

impl ServiceGraph {
    pub fn new<'a>(services: impl IntoIterator<Item = &'a String>) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = BTreeMap::new();
        for service in services {
            if !node_map.contains_key(service) {
                let index = graph.add_node(service.clone());
                node_map.insert(service.clone(), index);
            }
        }
        Self { graph, node_map }
    }

    /// Build the graph over `services` with every dependency as an edge.
    pub fn build<'a>(
        services: impl IntoIterator<Item = &'a String>,
        dependencies: &[ServiceDependency],
    ) -> Self {
        let mut graph = Self::new(services);
        for dependency in dependencies {
            graph.add_dependency(dependency);
        }
        graph
    }

    pub fn add_dependency(&mut self, dependency: &ServiceDependency) {
        let (Some(&source), Some(&target)) = (
            self.node_map.get(&dependency.source),
            self.node_map.get(&dependency.target),
        ) else {
            return;
        };
        self.graph.update_edge(source, target, dependency.strength);
    }

    pub fn service_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn has_edges(&self) -> bool {
        self.graph.edge_count() > 0
    }

    fn neighbors(&self, index: NodeIndex, direction: Direction) -> BTreeSet<NodeIndex> {
        self.graph.neighbors_directed(index, direction).collect()
    }

    /// Services with an edge into `service`
    pub fn dependents(&self, service: &str) -> Vec<&str> {
        let Some(&index) = self.node_map.get(service) else {
            return Vec::new();
        };
        self.neighbors(index, Direction::Incoming)
            .into_iter()
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    /// `(in-degree + out-degree) / (n - 1)` for every service, by name
    pub fn degree_centrality(&self) -> BTreeMap<String, f64> {
        let n = self.service_count();
        let scale = if n > 1 { 1.0 / (n - 1) as f64 } else { 0.0 };

        self.node_map
            .iter()
            .map(|(name, &index)| {
                let degree = self.neighbors(index, Direction::Incoming).len()
                    + self.neighbors(index, Direction::Outgoing).len();
                (name.clone(), degree as f64 * scale)
            })
            .collect()
    }

    /// Every elementary cycle, each starting at its lowest-indexed service.
    ///
    /// Cycles are enumerated by DFS from each node, restricted to nodes with
    /// a higher index than the start, so each cycle is found exactly once.
    pub fn simple_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();

        for start in self.graph.node_indices() {
            let mut path = vec![start];
            let mut on_path = BTreeSet::from([start]);
            self.extend_cycles(start, start, &mut path, &mut on_path, &mut cycles);
        }

        cycles
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|n| self.graph[n].clone()).collect())
            .collect()
    }

    fn extend_cycles(
        &self,
        start: NodeIndex,
        current: NodeIndex,
        path: &mut Vec<NodeIndex>,
        on_path: &mut BTreeSet<NodeIndex>,
        cycles: &mut Vec<Vec<NodeIndex>>,
    ) {
        for next in self.neighbors(current, Direction::Outgoing) {
            if next == start {
                cycles.push(path.clone());
            } else if next > start && !on_path.contains(&next) {
                path.push(next);
                on_path.insert(next);
                self.extend_cycles(start, next, path, on_path, cycles);
                on_path.remove(&next);
                path.pop();
            }
        }
    }
}

/// Whether a literal found in caller code refers to `endpoint_path`: equal
/// to it, or a URL whose path component (query and fragment stripped) is.
pub fn references_endpoint(literal: &str, endpoint_path: &str) -> bool {
    if literal == endpoint_path {
        return true;
    }
    let Some((_, rest)) = literal.split_once("://") else {
        return false;
    };
    let Some(slash) = rest.find('/') else {
        return false;
    };
    let path = &rest[slash..];
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path == endpoint_path
}

/// Infer API edges: a service whose literals reference another service's
/// endpoint path depends on that service. One edge per (caller, callee,
/// path).
pub fn infer_api_dependencies(
    scans: &BTreeMap<String, ServiceScan>,
    strength: f64,
) -> Vec<ServiceDependency> {
    let mut dependencies = Vec::new();
    let mut seen = BTreeSet::new();

    for (callee, callee_scan) in scans {
        for endpoint in &callee_scan.profile.endpoints {
            for (caller, caller_scan) in scans {
                if caller == callee {
                    continue;
                }
                let calls_endpoint = caller_scan
                    .path_literals
                    .iter()
                    .any(|literal| references_endpoint(literal, &endpoint.path));
                if calls_endpoint && seen.insert((caller, callee, &endpoint.path)) {
                    dependencies.push(ServiceDependency {
                        source: caller.clone(),
                        target: callee.clone(),
                        kind: DependencyKind::Api,
                        strength,
                        calls: vec![endpoint.path.clone()],
                    });
                }
            }
        }
    }

    dependencies
}
