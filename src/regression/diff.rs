//! Unified diff splitting

/// Lines of one unified diff, without their `+`/`-`/` ` markers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffLines<'a> {
    pub removed: Vec<&'a str>,
    pub added: Vec<&'a str>,
    /// Post-change view of the hunk bodies: context and added lines in diff
    /// order, flagged `true` when added.
    pub new_side: Vec<(bool, &'a str)>,
}

impl<'a> DiffLines<'a> {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Removed lines followed by added lines
    pub fn changed(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.removed.iter().chain(self.added.iter()).copied()
    }
}

/// Split a unified diff. `---`/`+++` file headers and `@@` hunk headers
/// are not content.
pub fn split_diff(diff: &str) -> DiffLines<'_> {
    let mut lines = DiffLines::default();

    for line in diff.lines() {
        if line.starts_with("---") || line.starts_with("+++") || line.starts_with("@@") {
            continue;
        }
        if let Some(removed) = line.strip_prefix('-') {
            lines.removed.push(removed);
        } else if let Some(added) = line.strip_prefix('+') {
            lines.added.push(added);
            lines.new_side.push((true, added));
        } else if let Some(context) = line.strip_prefix(' ') {
            lines.new_side.push((false, context));
        }
    }

    lines
}
