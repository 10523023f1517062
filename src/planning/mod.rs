//! Refactor planning
//!
//! A plan is built in four passes over an [`ArchitectureAnalysis`]:
//! strategy step generation, keyword prioritization, dependency ordering and
//! risk assessment. Every pass is a pure function of its inputs; the only
//! non-deterministic parts of a plan are its id and creation time.

pub mod assessment;
pub mod migration;
pub mod ordering;
pub mod prioritize;
pub mod strategies;

pub use assessment::{assess_plan_risks, define_success_criteria, ROLLBACK_PLAN};
pub use migration::{catalog, find_strategy, recommend_strategy, MigrationPhase, MigrationStrategy};
pub use ordering::{order_by_dependencies, OrderedSteps, StepGraph};
pub use prioritize::{prioritize_steps, priority_rank};
pub use strategies::generate_steps;

use crate::config::PlanningConfig;
use crate::core::errors::{Error, Result};
use crate::core::{ArchitectureAnalysis, RefactorPlan, SafetyLevel, TargetArchitecture};
use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn};
use xxhash_rust::xxh64::Xxh64;

/// Planner bound to configured defaults, for callers that don't pass every
/// option explicitly.
#[derive(Debug, Clone, Default)]
pub struct RefactorPlanner {
    defaults: PlanningConfig,
}

impl RefactorPlanner {
    pub fn new(defaults: PlanningConfig) -> Self {
        Self { defaults }
    }

    /// Plan with the configured target, safety level and priorities.
    pub fn plan(&self, analysis: Option<&ArchitectureAnalysis>) -> Result<RefactorPlan> {
        let priorities = (!self.defaults.priorities.is_empty())
            .then_some(self.defaults.priorities.as_slice());
        create_plan(
            analysis,
            self.defaults.target_architecture,
            self.defaults.safety_level,
            priorities,
        )
    }
}

/// Build a refactor plan. Fails only when no analysis is supplied.
///
/// When the step graph is cyclic the steps keep their prioritized order and
/// `dependency_cycle` is set on the plan and on its risk assessment.
pub fn create_plan(
    analysis: Option<&ArchitectureAnalysis>,
    target: TargetArchitecture,
    safety: SafetyLevel,
    priorities: Option<&[String]>,
) -> Result<RefactorPlan> {
    let analysis = analysis.ok_or_else(|| {
        Error::PlanningPrecondition("an architecture analysis is required to create a plan".into())
    })?;

    let _span = info_span!("create_plan", target = %target, safety = %safety).entered();

    let steps = generate_steps(target, analysis, safety);
    debug!(count = steps.len(), "Generated candidate steps");

    let steps = match priorities {
        Some(priorities) => prioritize_steps(steps, priorities),
        None => steps,
    };

    let OrderedSteps {
        steps,
        dependency_cycle,
    } = order_by_dependencies(steps);
    if dependency_cycle {
        warn!("Plan steps are in prioritized order; dependency ordering was skipped");
    }

    let risk_assessment = assess_plan_risks(&steps, dependency_cycle);
    let success_criteria = define_success_criteria(target, analysis);
    let total_effort = steps.iter().map(|step| step.estimated_effort).sum();
    let created_at = Utc::now();

    let plan = RefactorPlan {
        id: plan_id(target, created_at, steps.iter().map(|s| s.id.as_str())),
        created_at,
        target_architecture: target,
        safety_level: safety,
        steps,
        total_effort,
        risk_assessment,
        success_criteria,
        rollback_plan: Some(ROLLBACK_PLAN.to_string()),
        dependency_cycle,
    };

    info!(
        id = %plan.id,
        steps = plan.steps.len(),
        total_effort = plan.total_effort,
        risk_score = plan.risk_assessment.total_risk_score,
        "Created refactor plan"
    );
    Ok(plan)
}

fn plan_id<'a>(
    target: TargetArchitecture,
    created_at: DateTime<Utc>,
    step_ids: impl Iterator<Item = &'a str>,
) -> String {
    let mut hasher = Xxh64::new(0);
    hasher.update(target.as_str().as_bytes());
    hasher.update(created_at.to_rfc3339().as_bytes());
    for id in step_ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\0");
    }
    format!("{:016x}", hasher.digest())
}
