use super::diff::DiffLines;
use super::rules::{
    AUTHORIZATION_REMOVED, AUTH_MARKER, HARDCODED_SECRET, HARDCODED_SECRETS, POTENTIAL_INJECTION,
    SQL_INTERPOLATION,
};
use crate::core::RegressionRisk;
use tracing::debug;

pub fn check_security_impacts(lines: &DiffLines<'_>, file_path: &str) -> Vec<RegressionRisk> {
    let mut risks = Vec::new();

    if let Some(kind) = first_pattern_hit(&lines.added, &SQL_INTERPOLATION) {
        debug!(file = file_path, kind, "Query built by string interpolation");
        risks.push(
            POTENTIAL_INJECTION.emit_for("Potential SQL injection vulnerability", file_path),
        );
    }

    let removed_auth = lines.removed.iter().any(|l| AUTH_MARKER.is_match(l));
    let added_auth = lines.added.iter().any(|l| AUTH_MARKER.is_match(l));
    if removed_auth && !added_auth {
        risks.push(AUTHORIZATION_REMOVED.emit_for(
            "Authentication/authorization checks removed",
            file_path,
        ));
    }

    if let Some(kind) = first_pattern_hit(&lines.added, &HARDCODED_SECRETS) {
        debug!(file = file_path, kind, "Credential literal added");
        risks.push(HARDCODED_SECRET.emit_for("Hardcoded secrets detected", file_path));
    }

    risks
}

fn first_pattern_hit(side: &[&str], table: &[(&'static str, regex::Regex)]) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, pattern)| side.iter().any(|line| pattern.is_match(line)))
        .map(|(name, _)| *name)
}
