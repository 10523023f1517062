//! Recommendations and risk areas derived from profiles and the graph.

use super::graph::ServiceGraph;
use crate::config::AnalysisConfig;
use crate::core::{RiskArea, RiskAreaKind, ServiceProfile};
use std::collections::BTreeMap;

const UNVERSIONED_LISTED: usize = 5;
const HIGH_COUPLING_CENTRALITY: f64 = 0.5;

pub fn generate_recommendations(
    services: &BTreeMap<String, ServiceProfile>,
    graph: &ServiceGraph,
    config: &AnalysisConfig,
) -> Vec<String> {
    let mut recommendations: Vec<String> = graph
        .simple_cycles()
        .into_iter()
        .map(|cycle| {
            let closing = cycle.first().cloned().unwrap_or_default();
            format!(
                "Remove circular dependency between services: {} -> {}",
                cycle.join(" -> "),
                closing
            )
        })
        .collect();

    recommendations.extend(
        services
            .values()
            .filter(|s| s.total_complexity > config.max_service_complexity)
            .map(|s| {
                format!(
                    "Consider breaking down {} - complexity score: {}",
                    s.name, s.total_complexity
                )
            }),
    );

    let unversioned: Vec<String> = services
        .values()
        .flat_map(|s| {
            s.endpoints
                .iter()
                .filter(|e| !e.is_versioned())
                .map(move |e| format!("{}:{}", s.name, e.path))
        })
        .collect();
    if !unversioned.is_empty() {
        let listed = &unversioned[..unversioned.len().min(UNVERSIONED_LISTED)];
        let more = if unversioned.len() > UNVERSIONED_LISTED {
            ", ..."
        } else {
            ""
        };
        recommendations.push(format!(
            "Add API versioning to endpoints: {}{}",
            listed.join(", "),
            more
        ));
    }

    let services_with_tables = services.values().filter(|s| !s.tables.is_empty()).count();
    if services_with_tables > 1 {
        recommendations.push(
            "Consider implementing database-per-service pattern for better isolation".to_string(),
        );
    }

    recommendations
}

/// High-coupling entries (centrality > 0.5) first, then single points of
/// failure (distinct dependents > half the service count).
pub fn identify_risk_areas(
    services: &BTreeMap<String, ServiceProfile>,
    graph: &ServiceGraph,
) -> Vec<RiskArea> {
    let mut risk_areas = Vec::new();
    let n = services.len();

    if graph.has_edges() {
        for (service, score) in graph.degree_centrality() {
            if score > HIGH_COUPLING_CENTRALITY {
                risk_areas.push(RiskArea {
                    kind: RiskAreaKind::HighCoupling,
                    description: format!(
                        "{service} is highly coupled (degree centrality {score:.2})"
                    ),
                    service,
                    risk_score: score,
                });
            }
        }
    }

    for name in services.keys() {
        let dependents = graph.dependents(name).len();
        if dependents as f64 > n as f64 * 0.5 {
            risk_areas.push(RiskArea {
                kind: RiskAreaKind::SinglePointOfFailure,
                service: name.clone(),
                risk_score: dependents as f64 / n as f64,
                description: format!("{name} is a dependency for {dependents} services"),
            });
        }
    }

    risk_areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DependencyKind, EndpointFact, ServiceDependency};

    fn profile(name: &str, complexity: u32, paths: &[&str], tables: &[&str]) -> ServiceProfile {
        let mut p = ServiceProfile::new(name, name);
        p.total_complexity = complexity;
        p.endpoints = paths
            .iter()
            .map(|path| EndpointFact {
                path: path.to_string(),
                method: "GET".into(),
                framework: "flask".into(),
            })
            .collect();
        p.tables = tables.iter().map(|t| t.to_string()).collect();
        p
    }

    fn dep(source: &str, target: &str) -> ServiceDependency {
        ServiceDependency {
            source: source.into(),
            target: target.into(),
            kind: DependencyKind::Api,
            strength: 0.7,
            calls: vec![],
        }
    }

    fn services(list: Vec<ServiceProfile>) -> BTreeMap<String, ServiceProfile> {
        list.into_iter().map(|p| (p.name.clone(), p)).collect()
    }

    #[test]
    fn test_recommendations_cover_each_rule() {
        let services = services(vec![
            profile("auth", 150, &["/v1/login"], &["users"]),
            profile(
                "users",
                20,
                &["/a", "/b", "/c", "/d", "/e", "/f"],
                &["users"],
            ),
        ]);
        let graph = ServiceGraph::build(services.keys(), &[dep("auth", "users"), dep("users", "auth")]);
        let recs = generate_recommendations(&services, &graph, &AnalysisConfig::default());

        assert_eq!(
            recs,
            vec![
                "Remove circular dependency between services: auth -> users -> auth".to_string(),
                "Consider breaking down auth - complexity score: 150".to_string(),
                "Add API versioning to endpoints: users:/a, users:/b, users:/c, users:/d, users:/e, ..."
                    .to_string(),
                "Consider implementing database-per-service pattern for better isolation"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_single_point_of_failure_and_coupling() {
        let services = services(vec![
            profile("a", 1, &[], &[]),
            profile("b", 1, &[], &[]),
            profile("core", 1, &[], &[]),
        ]);
        let graph = ServiceGraph::build(services.keys(), &[dep("a", "core"), dep("b", "core")]);
        let areas = identify_risk_areas(&services, &graph);

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].kind, RiskAreaKind::HighCoupling);
        assert_eq!(areas[0].service, "core");
        assert_eq!(areas[0].risk_score, 1.0);
        assert_eq!(areas[1].kind, RiskAreaKind::SinglePointOfFailure);
        assert_eq!(areas[1].description, "core is a dependency for 2 services");
    }

    #[test]
    fn test_no_edges_no_risk_areas() {
        let services = services(vec![profile("a", 1, &[], &[])]);
        let graph = ServiceGraph::build(services.keys(), &[]);
        assert!(identify_risk_areas(&services, &graph).is_empty());
    }
}
