//! Step generation, one pure function per target architecture.
//!
//! Effort (hours) and risk for each step kind are fixed:
//!
//! | step | type | effort | risk |
//! |---|---|---|---|
//! | `extract-context-{svc}` | split_service | 16 | medium |
//! | `implement-aggregates` | restructure | 24 | low |
//! | `create-domain-events` | restructure | 16 | medium |
//! | `implement-repositories` | interface_extraction | 12 | low |
//! | `setup-message-broker` | restructure | 8 | low |
//! | `async-{src}-{dst}` | restructure | 8 | high (safety high) / medium |
//! | `implement-event-sourcing` | database_migration | 40 | high |
//! | `separate-db-{group}` | database_migration | 24 | high |
//! | `api-versioning-{svc}` | api_versioning | 8 | medium |
//! | `setup-service-mesh` | restructure | 32 | medium |
//! | `split-god-service-{svc}` | split_service | 40 | high |
//! | `reduce-complexity-{svc}` | restructure | 16 | low |
//! | `remove-dead-code` | remove_dead_code | 8 | low |

use crate::core::{
    ArchitectureAnalysis, DependencyKind, RefactorStep, RefactorType, RiskLevel, SafetyLevel,
    ServiceProfile, SmellType, TargetArchitecture,
};
use std::collections::BTreeSet;

/// Services with more endpoints than this likely hold several bounded contexts
const BOUNDED_CONTEXT_ENDPOINTS: usize = 10;
/// API edges at least this strong are converted to events
const ASYNC_CONVERSION_STRENGTH: f64 = 0.5;

const HIGH_RISK_ROLLBACK: &str =
    "Revert the step's commits in reverse order and redeploy the previous service versions";
const DATABASE_ROLLBACK: &str =
    "Restore the pre-migration database backup and revert the schema and data-access changes";

/// Generate candidate steps for `target` in strategy order.
pub fn generate_steps(
    target: TargetArchitecture,
    analysis: &ArchitectureAnalysis,
    safety: SafetyLevel,
) -> Vec<RefactorStep> {
    let steps = match target {
        TargetArchitecture::DomainDriven => plan_domain_driven(analysis, safety),
        TargetArchitecture::EventDriven => plan_event_driven(analysis, safety),
        TargetArchitecture::Microservices => plan_microservices(analysis, safety),
        TargetArchitecture::GenericSmellDriven => plan_generic_improvements(analysis, safety),
    };
    let steps = steps.into_iter().map(attach_rollback_strategy).collect();
    disambiguate_ids(steps)
}

/// Service names may contain `-`, so two generated ids can coincide
/// (`async-a-b` + `c` and `a` + `b-c`). Later duplicates get the first free
/// numeric suffix that no other step uses.
fn disambiguate_ids(mut steps: Vec<RefactorStep>) -> Vec<RefactorStep> {
    let generated: BTreeSet<String> = steps.iter().map(|s| s.id.clone()).collect();
    let mut taken = BTreeSet::new();
    for step in &mut steps {
        if taken.insert(step.id.clone()) {
            continue;
        }
        let unique = (2..)
            .map(|n| format!("{}-{n}", step.id))
            .find(|candidate| !generated.contains(candidate) && !taken.contains(candidate))
            .unwrap_or_default();
        taken.insert(unique.clone());
        step.id = unique;
    }
    steps
}

fn step(
    id: impl Into<String>,
    step_type: RefactorType,
    description: impl Into<String>,
    estimated_effort: u32,
    risk_level: RiskLevel,
) -> RefactorStep {
    RefactorStep {
        id: id.into(),
        step_type,
        description: description.into(),
        target_files: Vec::new(),
        dependencies: Vec::new(),
        estimated_effort,
        risk_level,
        rollback_strategy: None,
        validation_steps: Vec::new(),
        commit_message: None,
    }
}

trait StepExt {
    fn targets(self, files: Vec<String>) -> Self;
    fn depends_on(self, dependency: &str) -> Self;
    fn validate(self, checks: &[&str]) -> Self;
    fn commit(self, message: impl Into<String>) -> Self;
}

impl StepExt for RefactorStep {
    fn targets(mut self, files: Vec<String>) -> Self {
        self.target_files = files;
        self
    }

    fn depends_on(mut self, dependency: &str) -> Self {
        self.dependencies.push(dependency.to_string());
        self
    }

    fn validate(mut self, checks: &[&str]) -> Self {
        self.validation_steps = checks.iter().map(|c| c.to_string()).collect();
        self
    }

    fn commit(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }
}

fn attach_rollback_strategy(mut step: RefactorStep) -> RefactorStep {
    if step.rollback_strategy.is_none() {
        step.rollback_strategy = if step.step_type == RefactorType::DatabaseMigration {
            Some(DATABASE_ROLLBACK.to_string())
        } else if step.risk_level == RiskLevel::High {
            Some(HIGH_RISK_ROLLBACK.to_string())
        } else {
            None
        };
    }
    step
}

fn file_strings(profile: &ServiceProfile) -> Vec<String> {
    profile
        .files
        .iter()
        .map(|f| f.to_string_lossy().into_owned())
        .collect()
}

pub fn plan_domain_driven(analysis: &ArchitectureAnalysis, _safety: SafetyLevel) -> Vec<RefactorStep> {
    let mut steps: Vec<RefactorStep> = analysis
        .services
        .values()
        .filter(|service| service.endpoint_count() > BOUNDED_CONTEXT_ENDPOINTS)
        .map(|service| {
            step(
                format!("extract-context-{}", service.name),
                RefactorType::SplitService,
                format!("Extract bounded contexts from {}", service.name),
                16,
                RiskLevel::Medium,
            )
            .targets(file_strings(service))
            .validate(&[
                "Verify all endpoints still function",
                "Check data consistency",
                "Validate domain boundaries",
            ])
            .commit(format!(
                "refactor: extract bounded contexts from {}",
                service.name
            ))
        })
        .collect();

    steps.push(
        step(
            "implement-aggregates",
            RefactorType::Restructure,
            "Implement DDD aggregates and entities",
            24,
            RiskLevel::Low,
        )
        .depends_on("extract-context-*")
        .validate(&[
            "Verify aggregate boundaries",
            "Check invariant enforcement",
            "Validate entity relationships",
        ])
        .commit("refactor: implement DDD aggregates and entities"),
    );

    steps.push(
        step(
            "create-domain-events",
            RefactorType::Restructure,
            "Implement domain events for cross-aggregate communication",
            16,
            RiskLevel::Medium,
        )
        .depends_on("implement-aggregates")
        .validate(&[
            "Verify event publishing",
            "Check event handling",
            "Validate event sourcing if applicable",
        ])
        .commit("feat: add domain events for aggregate communication"),
    );

    steps.push(
        step(
            "implement-repositories",
            RefactorType::InterfaceExtraction,
            "Create repository interfaces and implementations",
            12,
            RiskLevel::Low,
        )
        .depends_on("implement-aggregates")
        .validate(&[
            "Verify data access patterns",
            "Check repository contracts",
            "Validate persistence logic",
        ])
        .commit("refactor: implement repository pattern for data access"),
    );

    steps
}

pub fn plan_event_driven(analysis: &ArchitectureAnalysis, safety: SafetyLevel) -> Vec<RefactorStep> {
    let mut steps = vec![step(
        "setup-message-broker",
        RefactorType::Restructure,
        "Set up message broker infrastructure (Kafka/RabbitMQ)",
        8,
        RiskLevel::Low,
    )
    .targets(vec![
        "docker-compose.yml".to_string(),
        "infrastructure/".to_string(),
    ])
    .validate(&[
        "Verify broker connectivity",
        "Check topic/queue creation",
        "Validate message persistence",
    ])
    .commit("feat: add message broker infrastructure")];

    let conversion_risk = if safety == SafetyLevel::High {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    let mut converted = BTreeSet::new();
    for dep in &analysis.dependencies {
        if dep.kind != DependencyKind::Api || dep.strength <= ASYNC_CONVERSION_STRENGTH {
            continue;
        }
        if !converted.insert((dep.source.as_str(), dep.target.as_str())) {
            continue;
        }
        steps.push(
            step(
                format!("async-{}-{}", dep.source, dep.target),
                RefactorType::Restructure,
                format!(
                    "Convert sync call from {} to {} to async events",
                    dep.source, dep.target
                ),
                8,
                conversion_risk,
            )
            .depends_on("setup-message-broker")
            .validate(&[
                "Verify event publishing",
                "Check event consumption",
                "Validate data consistency",
                "Test failure scenarios",
            ])
            .commit(format!(
                "refactor: convert {}->{} to async events",
                dep.source, dep.target
            )),
        );
    }

    if safety != SafetyLevel::Low {
        steps.push(
            step(
                "implement-event-sourcing",
                RefactorType::DatabaseMigration,
                "Implement event sourcing for critical aggregates",
                40,
                RiskLevel::High,
            )
            .depends_on("async-*")
            .validate(&[
                "Verify event store",
                "Check event replay",
                "Validate projections",
                "Test snapshot functionality",
            ])
            .commit("feat: implement event sourcing for audit and replay"),
        );
    }

    steps
}

/// Groups of services sharing at least one table with the group's first
/// member. A service joins at most one group.
pub fn find_shared_database_groups(analysis: &ArchitectureAnalysis) -> Vec<Vec<String>> {
    let mut groups = Vec::new();
    let mut processed: BTreeSet<&str> = BTreeSet::new();

    for (name, service) in &analysis.services {
        if processed.contains(name.as_str()) {
            continue;
        }
        let mut group = vec![name.as_str()];
        for (other, other_service) in &analysis.services {
            if other != name
                && !processed.contains(other.as_str())
                && !service.tables.is_disjoint(&other_service.tables)
            {
                group.push(other.as_str());
            }
        }
        if group.len() > 1 {
            processed.extend(group.iter().copied());
            groups.push(group.into_iter().map(String::from).collect());
        }
    }

    groups
}

fn is_api_file(service: &ServiceProfile, file: &std::path::Path) -> bool {
    let relative = file.strip_prefix(&service.path).unwrap_or(file);
    let text = relative.to_string_lossy();
    text.contains("api") || text.contains("route")
}

pub fn plan_microservices(analysis: &ArchitectureAnalysis, safety: SafetyLevel) -> Vec<RefactorStep> {
    let mut steps: Vec<RefactorStep> = find_shared_database_groups(analysis)
        .into_iter()
        .map(|group| {
            step(
                format!("separate-db-{}", group.join("-")),
                RefactorType::DatabaseMigration,
                format!("Separate databases for services: {}", group.join(", ")),
                24,
                RiskLevel::High,
            )
            .validate(&[
                "Verify data migration",
                "Check data consistency",
                "Validate cross-service queries",
                "Test rollback procedures",
            ])
            .commit(format!(
                "refactor: implement database-per-service for {}",
                group.join(", ")
            ))
        })
        .collect();

    for service in analysis.services.values() {
        if service.endpoints.iter().all(|e| e.is_versioned()) {
            continue;
        }
        let api_files = service
            .files
            .iter()
            .filter(|f| is_api_file(service, f))
            .map(|f| f.to_string_lossy().into_owned())
            .collect();
        steps.push(
            step(
                format!("api-versioning-{}", service.name),
                RefactorType::ApiVersioning,
                format!("Add API versioning to {}", service.name),
                8,
                RiskLevel::Medium,
            )
            .targets(api_files)
            .validate(&[
                "Verify backward compatibility",
                "Check version routing",
                "Validate deprecation headers",
            ])
            .commit(format!("feat: add API versioning to {}", service.name)),
        );
    }

    if safety == SafetyLevel::High {
        steps.push(
            step(
                "setup-service-mesh",
                RefactorType::Restructure,
                "Implement service mesh for observability and security",
                32,
                RiskLevel::Medium,
            )
            .targets(vec!["kubernetes/".to_string(), "istio/".to_string()])
            .depends_on("api-versioning-*")
            .validate(&[
                "Verify mesh connectivity",
                "Check mTLS configuration",
                "Validate traffic policies",
                "Test circuit breakers",
            ])
            .commit("feat: add service mesh for improved microservices management"),
        );
    }

    steps
}

pub fn plan_generic_improvements(
    analysis: &ArchitectureAnalysis,
    _safety: SafetyLevel,
) -> Vec<RefactorStep> {
    let mut steps: Vec<RefactorStep> = analysis
        .smells_of(SmellType::GodService)
        .map(|smell| {
            let description = smell
                .suggested_fix
                .clone()
                .unwrap_or_else(|| format!("Split {} into smaller services", smell.location));
            step(
                format!("split-god-service-{}", smell.location),
                RefactorType::SplitService,
                description,
                40,
                RiskLevel::High,
            )
            .validate(&[
                "Verify service boundaries",
                "Check data consistency",
                "Validate API contracts",
                "Test integration points",
            ])
            .commit(format!(
                "refactor: split {} into focused services",
                smell.location
            ))
        })
        .collect();

    steps.extend(analysis.smells_of(SmellType::HighComplexity).map(|smell| {
        let description = smell
            .suggested_fix
            .clone()
            .unwrap_or_else(|| format!("Reduce complexity in {}", smell.location));
        step(
            format!("reduce-complexity-{}", smell.location),
            RefactorType::Restructure,
            description,
            16,
            RiskLevel::Low,
        )
        .validate(&[
            "Verify functionality preserved",
            "Check test coverage",
            "Validate performance",
        ])
        .commit(format!("refactor: reduce complexity in {}", smell.location))
    }));

    if analysis.smells_of(SmellType::DeadCode).next().is_some() {
        steps.push(
            step(
                "remove-dead-code",
                RefactorType::RemoveDeadCode,
                "Remove unused code and dependencies",
                8,
                RiskLevel::Low,
            )
            .validate(&[
                "Verify no runtime dependencies",
                "Check test coverage",
                "Validate build process",
            ])
            .commit("chore: remove dead code and unused dependencies"),
        );
    }

    steps
}
