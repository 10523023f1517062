use super::graph::ServiceGraph;
use crate::core::{ServiceDependency, ServiceProfile};
use std::collections::BTreeMap;

pub const TOTAL_SERVICES: &str = "total_services";
pub const TOTAL_DEPENDENCIES: &str = "total_dependencies";
pub const AVG_SERVICE_COMPLEXITY: &str = "avg_service_complexity";
pub const COUPLING_SCORE: &str = "coupling_score";
pub const AVG_ENDPOINTS_PER_SERVICE: &str = "avg_endpoints_per_service";
pub const MAX_CENTRALITY: &str = "max_centrality";
pub const AVG_CENTRALITY: &str = "avg_centrality";

/// `|dependencies| / max(n * (n - 1), 1)`
pub fn coupling_score(services: usize, dependencies: usize) -> f64 {
    let possible = services.saturating_mul(services.saturating_sub(1)).max(1);
    dependencies as f64 / possible as f64
}

/// Architecture metrics. Centrality entries are present only when the graph
/// has at least one edge.
pub fn calculate_metrics(
    services: &BTreeMap<String, ServiceProfile>,
    dependencies: &[ServiceDependency],
    graph: &ServiceGraph,
) -> BTreeMap<String, f64> {
    let n = services.len();
    let divisor = n.max(1) as f64;
    let total_complexity: u64 = services.values().map(|s| s.total_complexity as u64).sum();
    let total_endpoints: usize = services.values().map(|s| s.endpoint_count()).sum();

    let mut metrics = BTreeMap::from([
        (TOTAL_SERVICES.to_string(), n as f64),
        (TOTAL_DEPENDENCIES.to_string(), dependencies.len() as f64),
        (AVG_SERVICE_COMPLEXITY.to_string(), total_complexity as f64 / divisor),
        (COUPLING_SCORE.to_string(), coupling_score(n, dependencies.len())),
        (AVG_ENDPOINTS_PER_SERVICE.to_string(), total_endpoints as f64 / divisor),
    ]);

    if graph.has_edges() {
        let centrality = graph.degree_centrality();
        let max = centrality.values().copied().fold(0.0, f64::max);
        let avg = centrality.values().sum::<f64>() / centrality.len().max(1) as f64;
        metrics.insert(MAX_CENTRALITY.to_string(), max);
        metrics.insert(AVG_CENTRALITY.to_string(), avg);
    }

    metrics
}
