use crate::core::RefactorStep;

/// Index of the first keyword contained in the step's type tag or its
/// lower-cased description; `priorities.len()` when none matches.
pub fn priority_rank(step: &RefactorStep, priorities: &[String]) -> usize {
    let tag = step.step_type.as_str();
    let description = step.description.to_lowercase();
    priorities
        .iter()
        .position(|keyword| tag.contains(keyword.as_str()) || description.contains(keyword.as_str()))
        .unwrap_or(priorities.len())
}

/// Stable sort by rank, so equal ranks keep generation order.
pub fn prioritize_steps(mut steps: Vec<RefactorStep>, priorities: &[String]) -> Vec<RefactorStep> {
    if priorities.is_empty() {
        return steps;
    }
    steps.sort_by_cached_key(|step| priority_rank(step, priorities));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RefactorType, RiskLevel};

    fn step(id: &str, step_type: RefactorType, description: &str) -> RefactorStep {
        RefactorStep {
            id: id.into(),
            step_type,
            description: description.into(),
            target_files: vec![],
            dependencies: vec![],
            estimated_effort: 1,
            risk_level: RiskLevel::Low,
            rollback_strategy: None,
            validation_steps: vec![],
            commit_message: None,
        }
    }

    #[test]
    fn test_rank_checks_tag_then_description() {
        let priorities = vec!["database".to_string(), "versioning".to_string()];
        let db = step("a", RefactorType::DatabaseMigration, "Move tables");
        let api = step("b", RefactorType::Restructure, "Add API Versioning");
        let other = step("c", RefactorType::Restructure, "Tidy up");
        assert_eq!(priority_rank(&db, &priorities), 0);
        assert_eq!(priority_rank(&api, &priorities), 1);
        assert_eq!(priority_rank(&other, &priorities), 2);
    }

    #[test]
    fn test_sort_is_stable_for_equal_ranks() {
        let steps = vec![
            step("x1", RefactorType::Restructure, "first unmatched"),
            step("s1", RefactorType::SplitService, "split one"),
            step("x2", RefactorType::Restructure, "second unmatched"),
            step("s2", RefactorType::SplitService, "split two"),
        ];
        let ordered = prioritize_steps(steps, &["split".to_string()]);
        let ids: Vec<_> = ordered.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "x1", "x2"]);
    }
}
