//! Placeholder changes for dry runs without a transformation engine

use crate::core::{ChangeType, CodeChange, LineChanges, RefactorStep};

const SIMULATED_FILES: usize = 3;

/// One `modify` change per target file, at most three
pub fn simulate_changes(step: &RefactorStep) -> Vec<CodeChange> {
    step.target_files
        .iter()
        .filter(|path| !path.is_empty())
        .take(SIMULATED_FILES)
        .map(|path| CodeChange {
            file_path: path.clone(),
            change_type: ChangeType::Modify,
            diff: format!(
                "--- a/{path}\n+++ b/{path}\n@@ -1,3 +1,3 @@\n-old code\n+new refactored code\n"
            ),
            line_changes: LineChanges {
                added: 10,
                removed: 5,
            },
            semantic_changes: vec![format!(
                "Refactored according to {}",
                step.step_type.as_str()
            )],
        })
        .collect()
}
