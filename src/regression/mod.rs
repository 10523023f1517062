//! Regression risk classification
//!
//! Every change's unified diff is split into removed and added lines and run
//! through four independent rule families (API, behavior, performance,
//! security), plus rules specific to added and renamed files. Batch-level
//! rules run last. The result is deduplicated and sorted by
//! `severity_weight * 10 + type_weight`, descending and stable, so equal
//! priorities keep discovery order.

pub mod api;
pub mod behavior;
pub mod cross_change;
pub mod diff;
pub mod performance;
pub mod report;
pub mod rules;
pub mod security;
pub mod simulation;

pub use diff::{split_diff, DiffLines};
pub use report::render_report;
pub use simulation::simulate_changes;

use crate::core::{
    ArchitectureAnalysis, ChangeType, CodeChange, RefactorStep, RegressionRisk, RiskType,
};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, debug_span};

/// What the changes belong to. Only used to label diagnostics; the
/// classification depends on the changes alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext<'a> {
    pub step: Option<&'a RefactorStep>,
    pub analysis: Option<&'a ArchitectureAnalysis>,
}

impl<'a> ClassifyContext<'a> {
    pub fn for_step(step: &'a RefactorStep) -> Self {
        Self {
            step: Some(step),
            analysis: None,
        }
    }
}

/// Classify a batch of changes. Never fails; an empty list means nothing
/// risky was recognized.
pub fn classify_regression_risks(
    changes: &[CodeChange],
    context: &ClassifyContext<'_>,
) -> Vec<RegressionRisk> {
    let step_id = context.step.map(|s| s.id.as_str()).unwrap_or("-");
    let _span = debug_span!("classify", step = step_id, changes = changes.len()).entered();

    let mut risks: Vec<RegressionRisk> = changes.iter().flat_map(classify_change).collect();
    risks.extend(cross_change::check_cross_change_impacts(changes));

    let found = risks.len();
    let mut risks = deduplicate(risks);
    risks.sort_by_key(|risk| Reverse(risk.priority()));

    debug!(found, kept = risks.len(), "Classified regression risks");
    risks
}

fn classify_change(change: &CodeChange) -> Vec<RegressionRisk> {
    let lines = split_diff(&change.diff);
    let path = change.file_path.as_str();

    let mut risks = api::check_api_changes(&lines, path);
    risks.extend(behavior::check_behavior_changes(&lines, path));
    risks.extend(performance::check_performance_impacts(&lines, path));
    risks.extend(security::check_security_impacts(&lines, path));

    match change.change_type {
        ChangeType::Add => risks.extend(behavior::check_new_dependencies(&lines, path)),
        ChangeType::Rename => risks.push(api::check_rename(path)),
        ChangeType::Modify | ChangeType::Delete => {}
    }

    risks
}

/// Keep the first risk per (type, description, set of affected components)
fn deduplicate(risks: Vec<RegressionRisk>) -> Vec<RegressionRisk> {
    let mut seen: HashSet<(RiskType, String, BTreeSet<String>)> = HashSet::new();
    risks
        .into_iter()
        .filter(|risk| {
            seen.insert((
                risk.risk_type,
                risk.description.clone(),
                risk.affected_components.iter().cloned().collect(),
            ))
        })
        .collect()
}
