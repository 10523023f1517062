use super::diff::DiffLines;
use super::rules::{
    ASYNC_DEF, BLOCKING_IO, BLOCKING_IO_IN_ASYNC, DATA_ACCESS_CALL, LOOP, LOOPS_ADDED,
    QUERIES_ADDED,
};
use crate::core::RegressionRisk;
use regex::Regex;

pub fn check_performance_impacts(lines: &DiffLines<'_>, file_path: &str) -> Vec<RegressionRisk> {
    let mut risks = Vec::new();

    if count_matching(&lines.added, &LOOP) > count_matching(&lines.removed, &LOOP) {
        risks.push(LOOPS_ADDED.emit_for(
            "Additional loops added, potential performance impact",
            file_path,
        ));
    }

    if count_matching(&lines.added, &DATA_ACCESS_CALL)
        > count_matching(&lines.removed, &DATA_ACCESS_CALL)
    {
        risks.push(QUERIES_ADDED.emit_for("Additional database queries detected", file_path));
    }

    if adds_blocking_io_in_async(lines) {
        risks.push(BLOCKING_IO_IN_ASYNC.emit_for("Synchronous I/O in async function", file_path));
    }

    risks
}

fn count_matching(side: &[&str], pattern: &Regex) -> usize {
    side.iter().filter(|line| pattern.is_match(line)).count()
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Whether an added line makes a blocking call inside the body of an
/// `async def`, judged by indentation on the post-change side of the diff.
fn adds_blocking_io_in_async(lines: &DiffLines<'_>) -> bool {
    let mut async_indent: Option<usize> = None;

    for &(added, line) in &lines.new_side {
        if line.trim().is_empty() {
            continue;
        }
        let indent = indentation(line);

        if let Some(scope) = async_indent {
            if indent <= scope {
                async_indent = None;
            } else if added && BLOCKING_IO.is_match(line) {
                return true;
            }
        }

        if let Some(captures) = ASYNC_DEF.captures(line) {
            async_indent = Some(captures[1].len());
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use crate::regression::diff::split_diff;
    use indoc::indoc;

    #[test]
    fn test_added_loop_and_query() {
        let diff = indoc! {"
            -    user = session.query(User).get(uid)
            +    for uid in ids:
            +        user = session.query(User).filter(User.id == uid).first()
            +        orders = session.query(Order).filter_by(user=uid).all()
        "};
        let risks = check_performance_impacts(&split_diff(diff), "users.py");
        let found: Vec<_> = risks.iter().map(|r| (r.description.as_str(), r.severity)).collect();
        assert_eq!(
            found,
            vec![
                ("Additional loops added, potential performance impact", Severity::Medium),
                ("Additional database queries detected", Severity::High),
            ]
        );
    }

    #[test]
    fn test_blocking_call_inside_existing_async_function() {
        let diff = indoc! {"
            @@ -10,3 +10,4 @@
             async def fetch_profile(uid):
            +    resp = requests.get(f\"{BASE}/profiles/{uid}\")
                 return resp
        "};
        let risks = check_performance_impacts(&split_diff(diff), "client.py");
        assert!(risks
            .iter()
            .any(|r| r.description == "Synchronous I/O in async function"));
    }

    #[test]
    fn test_blocking_call_outside_async_is_ignored() {
        let diff = indoc! {"
             async def handler():
                 return 1
            +def load():
            +    return open('data.json').read()
        "};
        let risks = check_performance_impacts(&split_diff(diff), "load.py");
        assert!(risks.is_empty());
    }
}
