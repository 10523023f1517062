//! Rules over a whole batch of changes

use super::diff::split_diff;
use super::rules::{INTERFACES_MODIFIED, LARGE_BLAST_RADIUS, TYPE_DECLARATION};
use crate::core::{ChangeType, CodeChange, RegressionRisk};

/// Batches larger than this many changed files are flagged
pub const BLAST_RADIUS_FILES: usize = 10;
/// Files listed for a large batch before the ellipsis marker
const BLAST_RADIUS_LISTED: usize = 5;

pub fn check_cross_change_impacts(changes: &[CodeChange]) -> Vec<RegressionRisk> {
    let mut risks = Vec::new();

    let mut interface_files: Vec<String> = Vec::new();
    for change in changes {
        if change.change_type != ChangeType::Modify {
            continue;
        }
        let lines = split_diff(&change.diff);
        let touches_declaration = lines.changed().any(|line| TYPE_DECLARATION.is_match(line));
        if touches_declaration && !interface_files.contains(&change.file_path) {
            interface_files.push(change.file_path.clone());
        }
    }
    if interface_files.len() > 1 {
        risks.push(INTERFACES_MODIFIED.emit(
            "Multiple interfaces modified simultaneously",
            interface_files,
        ));
    }

    if changes.len() > BLAST_RADIUS_FILES {
        let mut affected: Vec<String> = changes
            .iter()
            .take(BLAST_RADIUS_LISTED)
            .map(|c| c.file_path.clone())
            .collect();
        affected.push("...".to_string());
        risks.push(LARGE_BLAST_RADIUS.emit("Large number of files changed", affected));
    }

    risks
}
