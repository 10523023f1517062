//! Markdown regression report for one plan step

use crate::core::{RefactorStep, RegressionRisk, Severity};
use std::fmt::Write;

const SEVERITY_SECTIONS: [Severity; 4] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
];

pub fn render_report(risks: &[RegressionRisk], step: &RefactorStep) -> String {
    if risks.is_empty() {
        return format!("No regression risks detected for step: {}", step.description);
    }

    let mut out = String::new();
    let _ = writeln!(out, "# Regression Analysis Report\n");
    let _ = writeln!(out, "**Step**: {}", step.description);
    let _ = writeln!(out, "**Type**: {}", step.step_type.as_str());
    let _ = writeln!(out, "**Risk Level**: {}\n", step.risk_level);
    let _ = writeln!(out, "## Detected Risks\n");

    for severity in SEVERITY_SECTIONS {
        let section: Vec<_> = risks.iter().filter(|r| r.severity == severity).collect();
        if section.is_empty() {
            continue;
        }
        let _ = writeln!(out, "### {} Severity\n", severity.as_str().to_uppercase());
        for risk in section {
            let _ = writeln!(out, "**{}**: {}", risk.risk_type.as_str(), risk.description);
            let _ = writeln!(out, "- Affected: {}", risk.affected_components.join(", "));
            if let Some(mitigation) = &risk.mitigation {
                let _ = writeln!(out, "- Mitigation: {mitigation}");
            }
            if !risk.test_suggestions.is_empty() {
                let _ = writeln!(out, "- Tests needed:");
                for test in &risk.test_suggestions {
                    let _ = writeln!(out, "  - {test}");
                }
            }
            out.push('\n');
        }
    }

    out.push_str("## Recommendations\n\n");
    out.push_str("1. Address all critical and high severity risks before proceeding\n");
    out.push_str("2. Implement suggested tests for each risk area\n");
    out.push_str("3. Consider breaking large changes into smaller steps\n");
    out.push_str("4. Set up monitoring for affected components\n");
    out
}
