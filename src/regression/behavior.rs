use super::diff::DiffLines;
use super::rules::{
    CONTROL_FLOW, CONTROL_FLOW_MODIFIED, DEPENDENCY_IMPORT, EXCEPTIONS_MODIFIED,
    EXCEPTION_HANDLING, NEW_DEPENDENCIES, RETURNS_MODIFIED, RETURN_STATEMENT,
};
use crate::core::RegressionRisk;
use regex::Regex;

pub fn check_behavior_changes(lines: &DiffLines<'_>, file_path: &str) -> Vec<RegressionRisk> {
    let mut risks = Vec::new();

    if matches_any(&lines.removed, &CONTROL_FLOW) && matches_any(&lines.added, &CONTROL_FLOW) {
        risks.push(CONTROL_FLOW_MODIFIED.emit_for("Control flow logic modified", file_path));
    }

    if return_statements(&lines.removed) != return_statements(&lines.added) {
        risks.push(RETURNS_MODIFIED.emit_for("Return values modified", file_path));
    }

    if matches_any(&lines.removed, &EXCEPTION_HANDLING)
        || matches_any(&lines.added, &EXCEPTION_HANDLING)
    {
        risks.push(EXCEPTIONS_MODIFIED.emit_for("Exception handling modified", file_path));
    }

    risks
}

fn matches_any(side: &[&str], pattern: &Regex) -> bool {
    side.iter().any(|line| pattern.is_match(line))
}

/// Added files that pull in imports
pub fn check_new_dependencies(lines: &DiffLines<'_>, file_path: &str) -> Option<RegressionRisk> {
    lines
        .added
        .iter()
        .any(|line| DEPENDENCY_IMPORT.is_match(line))
        .then(|| NEW_DEPENDENCIES.emit_for("New dependencies introduced", file_path))
}

/// Trimmed return lines as a sorted multiset
fn return_statements(side: &[&str]) -> Vec<String> {
    let mut returns: Vec<String> = side
        .iter()
        .filter(|line| RETURN_STATEMENT.is_match(line))
        .map(|line| line.trim().to_string())
        .collect();
    returns.sort();
    returns
}
