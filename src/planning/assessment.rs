//! Plan-level risk assessment, success criteria and rollback procedure.

use super::ordering::StepGraph;
use crate::analysis::metrics::COUPLING_SCORE;
use crate::core::{ArchitectureAnalysis, RefactorStep, RiskAssessment, RiskLevel, TargetArchitecture};
use std::collections::BTreeMap;

const CRITICAL_PATH_LIMIT: usize = 3;
const COUPLING_TARGET: f64 = 0.3;

const MITIGATION_STRATEGIES: &[&str] = &[
    "Implement comprehensive testing before high-risk changes",
    "Use feature flags for gradual rollout",
    "Maintain rollback procedures for each step",
    "Monitor system metrics during migration",
];

const BASELINE_CRITERIA: &[&str] = &[
    "All existing functionality preserved",
    "No degradation in performance metrics",
    "All tests passing with >80% coverage",
    "No increase in error rates",
];

pub const ROLLBACK_PLAN: &str = "\
Rollback Procedure:
1. Identify the failed step and its dependencies
2. Revert git commits in reverse order of application
3. Restore database backups if database migrations were involved
4. Redeploy previous service versions
5. Verify system functionality with smoke tests
6. Monitor error rates and performance metrics
7. Document lessons learned and adjust plan

Rollback checkpoints are created after each high-risk step.
Automated rollback triggers on:
- Test failure rate > 10%
- Error rate increase > 5%
- Performance degradation > 20%
";

/// Assess `steps`, already in plan order. `dependency_cycle` is carried into
/// the assessment so the signal travels with it.
pub fn assess_plan_risks(steps: &[RefactorStep], dependency_cycle: bool) -> RiskAssessment {
    let mut risk_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for step in steps {
        *risk_distribution
            .entry(step.risk_level.as_str().to_string())
            .or_default() += 1;
    }

    RiskAssessment {
        risk_distribution,
        high_risk_count: steps
            .iter()
            .filter(|s| s.risk_level == RiskLevel::High)
            .count(),
        total_risk_score: steps.iter().map(|s| s.risk_level.score()).sum(),
        mitigation_strategies: MITIGATION_STRATEGIES.iter().map(|s| s.to_string()).collect(),
        critical_paths: StepGraph::build(steps).critical_paths(CRITICAL_PATH_LIMIT),
        dependency_cycle,
    }
}

pub fn define_success_criteria(
    target: TargetArchitecture,
    analysis: &ArchitectureAnalysis,
) -> Vec<String> {
    let style_criteria: &[&str] = match target {
        TargetArchitecture::DomainDriven => &[
            "Clear bounded contexts established",
            "Aggregates enforce business invariants",
            "Domain events enable loose coupling",
        ],
        TargetArchitecture::EventDriven => &[
            "All synchronous dependencies converted to events",
            "Message delivery guarantees implemented",
            "Event replay capability verified",
        ],
        TargetArchitecture::Microservices => &[
            "Each service has its own database",
            "API versioning implemented",
            "Service discovery and load balancing functional",
        ],
        TargetArchitecture::GenericSmellDriven => &[],
    };

    let mut criteria: Vec<String> = BASELINE_CRITERIA
        .iter()
        .chain(style_criteria)
        .map(|s| s.to_string())
        .collect();

    let coupling = analysis.metric(COUPLING_SCORE);
    if coupling > COUPLING_TARGET {
        criteria.push(format!(
            "Coupling score reduced below {COUPLING_TARGET} (current: {coupling:.2})"
        ));
    }

    criteria
}
