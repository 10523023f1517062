//! Rule tables shared by the classifier families: what each rule emits and
//! the text patterns it looks for.

use crate::core::{RegressionRisk, RiskType, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

/// Fixed risk shape of one rule. Only the description and the affected
/// components vary per finding.
pub struct RiskRule {
    pub risk_type: RiskType,
    pub severity: Severity,
    pub mitigation: &'static str,
    pub test_suggestions: &'static [&'static str],
}

impl RiskRule {
    pub fn emit(&self, description: impl Into<String>, affected: Vec<String>) -> RegressionRisk {
        RegressionRisk {
            risk_type: self.risk_type,
            severity: self.severity,
            description: description.into(),
            affected_components: affected,
            mitigation: Some(self.mitigation.to_string()),
            test_suggestions: self.test_suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn emit_for(&self, description: impl Into<String>, file_path: &str) -> RegressionRisk {
        self.emit(description, vec![file_path.to_string()])
    }
}

pub const ENDPOINT_REMOVED: RiskRule = RiskRule {
    risk_type: RiskType::ApiChange,
    severity: Severity::Critical,
    mitigation: "Add deprecation notice and migration path",
    test_suggestions: &[
        "Test all client applications",
        "Verify API backward compatibility",
        "Check API documentation updates",
    ],
};

pub const ENDPOINT_MODIFIED: RiskRule = RiskRule {
    risk_type: RiskType::ApiChange,
    severity: Severity::High,
    mitigation: "Ensure backward compatibility or version the API",
    test_suggestions: &[
        "Test with existing API clients",
        "Verify request/response format compatibility",
        "Update API tests",
    ],
};

pub const PARAMETERS_REMOVED: RiskRule = RiskRule {
    risk_type: RiskType::ApiChange,
    severity: Severity::High,
    mitigation: "Update all callers or maintain backward compatibility",
    test_suggestions: &["Verify parameter validation", "Check default parameter values"],
};

pub const PARAMETERS_ADDED: RiskRule = RiskRule {
    severity: Severity::Medium,
    ..PARAMETERS_REMOVED
};

pub const FILE_RENAMED: RiskRule = RiskRule {
    risk_type: RiskType::ApiChange,
    severity: Severity::Medium,
    mitigation: "Update all imports and references",
    test_suggestions: &[
        "Verify all imports are updated",
        "Check configuration files",
        "Test module loading",
    ],
};

pub const CONTROL_FLOW_MODIFIED: RiskRule = RiskRule {
    risk_type: RiskType::BehaviorChange,
    severity: Severity::High,
    mitigation: "Ensure all edge cases are covered",
    test_suggestions: &[
        "Test all conditional branches",
        "Verify edge cases",
        "Check boundary conditions",
    ],
};

pub const RETURNS_MODIFIED: RiskRule = RiskRule {
    risk_type: RiskType::BehaviorChange,
    severity: Severity::High,
    mitigation: "Verify all callers handle new return values",
    test_suggestions: &[
        "Test return value compatibility",
        "Check error handling",
        "Verify type consistency",
    ],
};

pub const EXCEPTIONS_MODIFIED: RiskRule = RiskRule {
    risk_type: RiskType::BehaviorChange,
    severity: Severity::Medium,
    mitigation: "Ensure error handling remains robust",
    test_suggestions: &[
        "Test error scenarios",
        "Verify exception propagation",
        "Check error messages",
    ],
};

pub const NEW_DEPENDENCIES: RiskRule = RiskRule {
    risk_type: RiskType::BehaviorChange,
    severity: Severity::Low,
    mitigation: "Verify dependency compatibility and security",
    test_suggestions: &[
        "Check dependency versions",
        "Run security audit",
        "Test in isolated environment",
    ],
};

pub const INTERFACES_MODIFIED: RiskRule = RiskRule {
    risk_type: RiskType::BehaviorChange,
    severity: Severity::High,
    mitigation: "Ensure all implementations are updated consistently",
    test_suggestions: &[
        "Run integration tests",
        "Verify interface contracts",
        "Check for version mismatches",
    ],
};

pub const LARGE_BLAST_RADIUS: RiskRule = RiskRule {
    risk_type: RiskType::BehaviorChange,
    severity: Severity::Medium,
    mitigation: "Consider breaking into smaller, incremental changes",
    test_suggestions: &[
        "Run comprehensive test suite",
        "Perform staged rollout",
        "Monitor system behavior closely",
    ],
};

pub const LOOPS_ADDED: RiskRule = RiskRule {
    risk_type: RiskType::Performance,
    severity: Severity::Medium,
    mitigation: "Profile code and optimize if necessary",
    test_suggestions: &[
        "Run performance benchmarks",
        "Test with large datasets",
        "Monitor resource usage",
    ],
};

pub const QUERIES_ADDED: RiskRule = RiskRule {
    risk_type: RiskType::Performance,
    severity: Severity::High,
    mitigation: "Consider query optimization or caching",
    test_suggestions: &[
        "Profile database queries",
        "Check for N+1 query problems",
        "Test query performance",
    ],
};

pub const BLOCKING_IO_IN_ASYNC: RiskRule = RiskRule {
    risk_type: RiskType::Performance,
    severity: Severity::High,
    mitigation: "Use async I/O libraries",
    test_suggestions: &[
        "Test async performance",
        "Check for blocking operations",
        "Monitor event loop",
    ],
};

pub const POTENTIAL_INJECTION: RiskRule = RiskRule {
    risk_type: RiskType::Security,
    severity: Severity::Critical,
    mitigation: "Use parameterized queries",
    test_suggestions: &[
        "Test with malicious input",
        "Run security scanning tools",
        "Review query construction",
    ],
};

pub const AUTHORIZATION_REMOVED: RiskRule = RiskRule {
    risk_type: RiskType::Security,
    severity: Severity::Critical,
    mitigation: "Ensure proper access controls remain in place",
    test_suggestions: &[
        "Test unauthorized access attempts",
        "Verify permission checks",
        "Audit access logs",
    ],
};

pub const HARDCODED_SECRET: RiskRule = RiskRule {
    risk_type: RiskType::Security,
    severity: Severity::Critical,
    mitigation: "Use environment variables or secret management service",
    test_suggestions: &[
        "Scan for exposed secrets",
        "Verify secret rotation",
        "Check environment configuration",
    ],
};

fn compile_table(table: &[(&'static str, &str)]) -> Vec<(&'static str, Regex)> {
    table
        .iter()
        .map(|(name, pattern)| {
            let regex = Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid built-in pattern '{name}': {e}"));
            (*name, regex)
        })
        .collect()
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern: {e}"))
}

/// Endpoint declaration families. A family counts as one endpoint idiom
/// when comparing removed with added lines.
pub static ENDPOINT_DECLARATIONS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    compile_table(&[
        ("flask_route", r#"@\w+\.route\s*\(\s*['"]([^'"]+)['"]"#),
        (
            "fastapi_route",
            r#"@(?:app|router)\.(?:get|post|put|delete|patch|api_route)\s*\(\s*['"]([^'"]+)['"]"#,
        ),
        ("django_url", r#"\b(?:re_)?path\s*\(\s*['"]([^'"]*)['"]"#),
        (
            "express_route",
            r#"(?:^|[^@\w])(?:app|router)\.(?:get|post|put|delete|patch)\s*\(\s*['"]([^'"]+)['"]"#,
        ),
    ])
});

/// `name(params)` of a function definition
pub static FUNCTION_SIGNATURE: Lazy<Regex> =
    Lazy::new(|| compile(r"\b(?:def|function)\s+(\w+)\s*\(([^)]*)\)"));

pub static CONTROL_FLOW: Lazy<Regex> = Lazy::new(|| compile(r"\b(?:if|elif|while|for)\s"));

pub static LOOP: Lazy<Regex> = Lazy::new(|| compile(r"\b(?:for|while)\s"));

pub static RETURN_STATEMENT: Lazy<Regex> = Lazy::new(|| compile(r"\breturn\b"));

pub static EXCEPTION_HANDLING: Lazy<Regex> =
    Lazy::new(|| compile(r"\b(?:except|raise)\b|\btry\s*:|\bfinally\s*:"));

/// Query construction or ORM query calls
pub static DATA_ACCESS_CALL: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"\b(?:SELECT|INSERT|UPDATE|DELETE)\b|\.(?:query|filter|filter_by|execute|raw)\s*\(|\.(?:all|first|one|get)\(\)",
    )
});

pub static ASYNC_DEF: Lazy<Regex> = Lazy::new(|| compile(r"^(\s*)async\s+def\s"));

pub static BLOCKING_IO: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?:^|[^.\w])open\(|\brequests\.\w+\(|\burllib\.|\btime\.sleep\(|\bsubprocess\.")
});

/// SQL statement shapes used inside the injection patterns
const SQL: &str =
    r"(?:SELECT\b[^'\x22]*\bFROM|INSERT\s+INTO|UPDATE\s+\w+\s+SET|DELETE\s+FROM)";

/// String interpolation into a SQL statement
pub static SQL_INTERPOLATION: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let f_string = format!(
        r#"(?i)\b(?:r?f|fr)(?:"{{1,3}}[^"]*{SQL}[^"]*\{{[^}}]+\}}|'{{1,3}}[^']*{SQL}[^']*\{{[^}}]+\}})"#
    );
    let format_call = format!(r#"(?i){SQL}.*['"]\s*\.format\s*\("#);
    let percent = format!(r#"(?i){SQL}.*['"]\s*%\s*[\w(]"#);
    let concat_after = format!(r#"(?i){SQL}.*['"]\s*\+"#);
    let concat_before = format!(r#"(?i)\+\s*['"][^'"]*{SQL}"#);

    vec![
        ("f_string", compile(&f_string)),
        ("format_call", compile(&format_call)),
        ("percent_format", compile(&percent)),
        ("concatenation", compile(&concat_after)),
        ("concatenation", compile(&concat_before)),
    ]
});

/// Authentication and authorization markers
pub static AUTH_MARKER: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"@(?:login_required|requires_auth|permission_required|jwt_required|auth_required)\b|\bcheck_permissions?\b|\bauthenticate\w*|\bis_authenticated\b",
    )
});

pub static HARDCODED_SECRETS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    compile_table(&[
        (
            "credential_assignment",
            r#"(?i)\b\w*(?:password|passwd|secret|key|token)\w*\s*[:=]\s*['"][^'"]+['"]"#,
        ),
        (
            "cloud_credential",
            r#"\b(?:AWS|AZURE|GCP)_[A-Z_]+\s*[:=]\s*['"][^'"]+['"]"#,
        ),
        ("stripe_key", r"sk[_-]live[_-][0-9a-zA-Z]{24,}"),
        ("private_key", r"-----BEGIN (?:RSA |EC |OPENSSH )?PRIVATE KEY-----"),
    ])
});

/// Import statements introducing a dependency
pub static DEPENDENCY_IMPORT: Lazy<Regex> = Lazy::new(|| {
    compile(r"^\s*(?:import\s+\w|from\s+\S+\s+import\s)|\brequire\s*\(")
});

pub static TYPE_DECLARATION: Lazy<Regex> =
    Lazy::new(|| compile(r"\b(?:class|interface|trait)\s+\w+"));
