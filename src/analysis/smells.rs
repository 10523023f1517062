//! Code smell rules. Each rule is evaluated independently per service, or per
//! service pair for shared tables.

use super::profile::ServiceScan;
use crate::config::AnalysisConfig;
use crate::core::{CodeSmell, Severity, SmellType};
use std::collections::BTreeMap;

const GOD_SERVICE_EFFORT: u32 = 40;
const HIGH_COMPLEXITY_EFFORT: u32 = 16;
const SHARED_DATABASE_EFFORT: u32 = 24;
const DEAD_CODE_EFFORT: u32 = 8;

pub fn detect_god_service(scan: &ServiceScan, config: &AnalysisConfig) -> Option<CodeSmell> {
    let endpoints = scan.profile.endpoint_count();
    (endpoints > config.god_service_endpoints).then(|| CodeSmell {
        smell_type: SmellType::GodService,
        severity: Severity::High,
        location: scan.profile.name.clone(),
        description: format!("Service has {endpoints} endpoints, consider splitting"),
        suggested_fix: Some(
            "Split into smaller, focused services based on domain boundaries".to_string(),
        ),
        effort_estimate: Some(GOD_SERVICE_EFFORT),
    })
}

pub fn detect_high_complexity(scan: &ServiceScan, config: &AnalysisConfig) -> Option<CodeSmell> {
    let average = scan.profile.avg_file_complexity();
    (average > config.complexity_per_file).then(|| CodeSmell {
        smell_type: SmellType::HighComplexity,
        severity: Severity::Medium,
        location: scan.profile.name.clone(),
        description: format!("Average file complexity is {average:.1}"),
        suggested_fix: Some("Refactor complex functions and classes".to_string()),
        effort_estimate: Some(HIGH_COMPLEXITY_EFFORT),
    })
}

pub fn detect_dead_code(scan: &ServiceScan) -> Option<CodeSmell> {
    let unused = &scan.unused_private_functions;
    (!unused.is_empty()).then(|| CodeSmell {
        smell_type: SmellType::DeadCode,
        severity: Severity::Low,
        location: scan.profile.name.clone(),
        description: format!(
            "{} unused private function(s): {}",
            unused.len(),
            unused.join(", ")
        ),
        suggested_fix: Some("Remove unused code and dependencies".to_string()),
        effort_estimate: Some(DEAD_CODE_EFFORT),
    })
}

/// One smell per unordered pair of services whose table sets intersect.
/// Pairs are visited in name order, so the location always reads
/// `"{first} and {second}"` alphabetically.
pub fn detect_shared_databases(scans: &BTreeMap<String, ServiceScan>) -> Vec<CodeSmell> {
    let entries: Vec<(&String, &ServiceScan)> = scans.iter().collect();
    let mut smells = Vec::new();

    for (i, (first, first_scan)) in entries.iter().enumerate() {
        for (second, second_scan) in &entries[i + 1..] {
            let shared: Vec<&str> = first_scan
                .profile
                .tables
                .intersection(&second_scan.profile.tables)
                .map(String::as_str)
                .collect();
            if shared.is_empty() {
                continue;
            }
            smells.push(CodeSmell {
                smell_type: SmellType::SharedDatabase,
                severity: Severity::High,
                location: format!("{first} and {second}"),
                description: format!("Services share database tables: {}", shared.join(", ")),
                suggested_fix: Some(
                    "Consider database-per-service pattern or API-based data access".to_string(),
                ),
                effort_estimate: Some(SHARED_DATABASE_EFFORT),
            });
        }
    }

    smells
}

/// All smells: per-service rules in service order, then shared tables.
pub fn detect_smells(
    scans: &BTreeMap<String, ServiceScan>,
    config: &AnalysisConfig,
) -> Vec<CodeSmell> {
    let mut smells: Vec<CodeSmell> = scans
        .values()
        .flat_map(|scan| {
            [
                detect_god_service(scan, config),
                detect_high_complexity(scan, config),
                detect_dead_code(scan),
            ]
        })
        .flatten()
        .collect();
    smells.extend(detect_shared_databases(scans));
    smells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EndpointFact, ServiceProfile};
    use std::path::PathBuf;

    fn scan(name: &str, endpoints: usize, complexity: u32, files: usize, tables: &[&str]) -> ServiceScan {
        let mut profile = ServiceProfile::new(name, name);
        profile.endpoints = (0..endpoints)
            .map(|i| EndpointFact {
                path: format!("/api/{name}/{i}"),
                method: "GET".into(),
                framework: "flask".into(),
            })
            .collect();
        profile.total_complexity = complexity;
        profile.files = (0..files).map(|i| PathBuf::from(format!("{name}/{i}.py"))).collect();
        profile.tables = tables.iter().map(|t| t.to_string()).collect();
        ServiceScan {
            profile,
            ..ServiceScan::default()
        }
    }

    #[test]
    fn test_god_service_threshold_is_exclusive() {
        let config = AnalysisConfig::default();
        assert!(detect_god_service(&scan("a", 20, 1, 1, &[]), &config).is_none());
        let smell = detect_god_service(&scan("a", 21, 1, 1, &[]), &config).unwrap();
        assert_eq!(smell.severity, Severity::High);
        assert_eq!(smell.description, "Service has 21 endpoints, consider splitting");
    }

    #[test]
    fn test_high_complexity_uses_average_per_file() {
        let config = AnalysisConfig::default();
        assert!(detect_high_complexity(&scan("a", 0, 30, 3, &[]), &config).is_none());
        let smell = detect_high_complexity(&scan("a", 0, 31, 3, &[]), &config).unwrap();
        assert_eq!(smell.severity, Severity::Medium);
        assert_eq!(smell.description, "Average file complexity is 10.3");
    }

    #[test]
    fn test_shared_database_once_per_pair() {
        let scans: BTreeMap<_, _> = [
            ("orders", scan("orders", 0, 1, 1, &["users", "orders"])),
            ("users", scan("users", 0, 1, 1, &["users"])),
            ("billing", scan("billing", 0, 1, 1, &["invoices", "users"])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let smells = detect_shared_databases(&scans);
        let locations: Vec<_> = smells.iter().map(|s| s.location.as_str()).collect();
        assert_eq!(
            locations,
            vec!["billing and orders", "billing and users", "orders and users"]
        );
        assert!(smells.iter().all(|s| s.severity == Severity::High));
        assert_eq!(smells[0].description, "Services share database tables: users");
    }

    #[test]
    fn test_dead_code_lists_functions() {
        let mut s = scan("a", 0, 1, 1, &[]);
        s.unused_private_functions = vec!["_old".into(), "_stale".into()];
        let smell = detect_dead_code(&s).unwrap();
        assert_eq!(smell.smell_type, SmellType::DeadCode);
        assert_eq!(smell.description, "2 unused private function(s): _old, _stale");
    }
}
