//! API contract rules: endpoint declarations and function signatures

use super::diff::DiffLines;
use super::rules::{
    ENDPOINT_DECLARATIONS, ENDPOINT_MODIFIED, ENDPOINT_REMOVED, FILE_RENAMED, FUNCTION_SIGNATURE,
    PARAMETERS_ADDED, PARAMETERS_REMOVED,
};
use crate::core::RegressionRisk;

/// Parameter list change of one function present on both sides of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterChange {
    pub function: String,
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

pub fn check_api_changes(lines: &DiffLines<'_>, file_path: &str) -> Vec<RegressionRisk> {
    let mut risks = Vec::new();

    for (_, pattern) in ENDPOINT_DECLARATIONS.iter() {
        let Some(first_removed) = lines.removed.iter().find(|line| pattern.is_match(line)) else {
            continue;
        };
        if lines.added.iter().any(|line| pattern.is_match(line)) {
            risks.push(
                ENDPOINT_MODIFIED.emit_for(format!("API endpoint modified in {file_path}"), file_path),
            );
        } else {
            risks.push(ENDPOINT_REMOVED.emit_for(
                format!("API endpoint removed: {}", first_removed.trim()),
                file_path,
            ));
        }
    }

    for change in detect_parameter_changes(&lines.removed, &lines.added) {
        let rule = if change.removed.is_empty() {
            &PARAMETERS_ADDED
        } else {
            &PARAMETERS_REMOVED
        };
        let mut risk = rule.emit_for(
            format!("Function parameters changed: {}", change.function),
            file_path,
        );
        risk.test_suggestions
            .insert(0, format!("Test all calls to {}", change.function));
        risks.push(risk);
    }

    risks
}

pub fn check_rename(file_path: &str) -> RegressionRisk {
    FILE_RENAMED.emit_for(format!("File renamed: {file_path}"), file_path)
}

/// Functions whose parameter list differs between removed and added lines,
/// in the order they first appear among the removed lines. A reordered list
/// counts as a change with nothing removed.
pub fn detect_parameter_changes(removed: &[&str], added: &[&str]) -> Vec<ParameterChange> {
    let before = signatures(removed);
    let after = signatures(added);

    before
        .iter()
        .filter_map(|(name, old_params)| {
            let (_, new_params) = after.iter().find(|(other, _)| other == name)?;
            if old_params == new_params {
                return None;
            }
            Some(ParameterChange {
                function: name.clone(),
                removed: difference(old_params, new_params),
                added: difference(new_params, old_params),
            })
        })
        .collect()
}

/// Last signature seen per function name, in first-seen order
fn signatures(lines: &[&str]) -> Vec<(String, Vec<String>)> {
    let mut found: Vec<(String, Vec<String>)> = Vec::new();

    for captures in lines.iter().filter_map(|line| FUNCTION_SIGNATURE.captures(line)) {
        let name = captures[1].to_string();
        let params: Vec<String> = captures[2]
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        match found.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = params,
            None => found.push((name, params)),
        }
    }

    found
}

fn difference(left: &[String], right: &[String]) -> Vec<String> {
    left.iter().filter(|p| !right.contains(p)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RiskType, Severity};
    use crate::regression::diff::split_diff;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_removed_endpoint_is_critical() {
        let diff = indoc! {r#"
            --- a/api.py
            +++ b/api.py
            -@app.route("/users/<id>", methods=["DELETE"])
            -def delete_user(id):
            -    return db.delete(id)
        "#};
        let risks = check_api_changes(&split_diff(diff), "api.py");
        assert_eq!(risks[0].risk_type, RiskType::ApiChange);
        assert_eq!(risks[0].severity, Severity::Critical);
        assert_eq!(
            risks[0].description,
            r#"API endpoint removed: @app.route("/users/<id>", methods=["DELETE"])"#
        );
    }

    #[test]
    fn test_changed_endpoint_is_high() {
        let diff = indoc! {r#"
            -@app.route("/users")
            +@app.route("/v1/users")
        "#};
        let risks = check_api_changes(&split_diff(diff), "api.py");
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].severity, Severity::High);
        assert_eq!(risks[0].description, "API endpoint modified in api.py");
    }

    #[test]
    fn test_parameter_changes() {
        let removed = vec!["def charge(order, amount, currency):", "def refund(order):"];
        let added = vec!["def charge(order, amount):", "def refund(order, reason=None):"];
        let changes = detect_parameter_changes(&removed, &added);
        assert_eq!(
            changes,
            vec![
                ParameterChange {
                    function: "charge".into(),
                    removed: vec!["currency".into()],
                    added: vec![],
                },
                ParameterChange {
                    function: "refund".into(),
                    removed: vec![],
                    added: vec!["reason=None".into()],
                },
            ]
        );
    }

    #[test]
    fn test_parameter_risk_severity() {
        let diff = indoc! {"
            -def charge(order, amount, currency):
            +def charge(order, amount):
            -def refund(order):
            +def refund(order, reason=None):
        "};
        let risks = check_api_changes(&split_diff(diff), "billing.py");
        assert_eq!(risks.len(), 2);
        assert_eq!(risks[0].severity, Severity::High);
        assert_eq!(risks[0].test_suggestions[0], "Test all calls to charge");
        assert_eq!(risks[1].severity, Severity::Medium);
        assert_eq!(risks[1].description, "Function parameters changed: refund");
    }
}
