//! Catalog of textual idioms recognized by the extractor
//!
//! Three tables: endpoint declarations, data-access operations and
//! external-dependency call sites. Each entry is a regex tagged with the
//! framework or system it recognizes. The built-in tables cover Flask,
//! FastAPI, flask-restful, raw SQL, SQLAlchemy and the Django ORM; more
//! entries can be appended from `[extraction]` in the configuration.

use crate::config::{ExtractionConfig, IdiomSpec};
use crate::core::errors::{Error, Result};
use crate::core::{DataAccessFact, EndpointFact};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Endpoint idioms: `method` (optional) and `path` groups, `args` holds the
/// remainder of the decorator call.
const ENDPOINT_IDIOMS: &[(&str, &str)] = &[
    (
        "flask",
        r#"@app\.(?P<method>route|get|post|put|delete|patch)\s*\(\s*['"](?P<path>[^'"]+)['"](?P<args>[^)\n]*)\)"#,
    ),
    (
        "fastapi",
        r#"@router\.(?P<method>api_route|get|post|put|delete|patch)\s*\(\s*['"](?P<path>[^'"]+)['"](?P<args>[^)\n]*)\)"#,
    ),
    (
        "flask-restful",
        r#"@api\.(?P<method>route|resource)\s*\(\s*['"](?P<path>[^'"]+)['"](?P<args>[^)\n]*)\)"#,
    ),
];

const DATA_ACCESS_IDIOMS: &[(&str, &str)] = &[
    ("sql", r"(?i)\b(?P<operation>SELECT)\s+.+?\s+FROM\s+(?P<table>\w+)"),
    ("sql", r"(?i)\b(?P<operation>INSERT)\s+INTO\s+(?P<table>\w+)"),
    ("sql", r"(?i)\b(?P<operation>UPDATE)\s+(?P<table>\w+)\s+SET\b"),
    ("sql", r"(?i)\b(?P<operation>DELETE)\s+FROM\s+(?P<table>\w+)"),
    (
        "sql",
        r"(?i)\b(?P<operation>CREATE)\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<table>\w+)",
    ),
    ("sqlalchemy", r"db\.session\.(?P<operation>query|add|delete|commit)\s*\("),
    (
        "django-orm",
        r"\.objects\.(?P<operation>all|filter|get|create|update|delete)\s*\(",
    ),
];

const DEPENDENCY_IDIOMS: &[(&str, &str)] = &[
    ("requests", r"requests\.(?:get|post|put|delete|patch)\s*\("),
    ("boto3", r"boto3\.(?:client|resource)\s*\("),
    ("redis", r"redis\.(?:Redis|StrictRedis)\s*\("),
    ("psycopg2", r"psycopg2\.connect\s*\("),
    ("pymongo", r"pymongo\.MongoClient\s*\("),
    ("kafka", r"kafka\.Kafka(?:Producer|Consumer)\s*\("),
    ("celery", r"celery\.Celery\s*\("),
];

/// Decorator verbs that do not name an HTTP method themselves
const GENERIC_ROUTE_VERBS: &[&str] = &["route", "resource", "api_route"];

static METHODS_ARG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"methods\s*=\s*[\[(]\s*['"](\w+)['"]"#).unwrap());

static BUILTIN: Lazy<PatternCatalog> = Lazy::new(|| PatternCatalog {
    endpoints: compile_builtin(ENDPOINT_IDIOMS),
    data_access: compile_builtin(DATA_ACCESS_IDIOMS),
    dependencies: compile_builtin(DEPENDENCY_IDIOMS),
});

fn compile_builtin(table: &[(&str, &str)]) -> Vec<Idiom> {
    table
        .iter()
        .map(|(tag, pattern)| Idiom {
            tag: tag.to_string(),
            regex: Regex::new(pattern).unwrap(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Idiom {
    pub tag: String,
    pub regex: Regex,
}

impl Idiom {
    fn compile(spec: &IdiomSpec) -> Result<Self> {
        let regex = Regex::new(&spec.pattern).map_err(|source| Error::InvalidPattern {
            name: spec.tag.clone(),
            source,
        })?;
        Ok(Self {
            tag: spec.tag.clone(),
            regex,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PatternCatalog {
    endpoints: Vec<Idiom>,
    data_access: Vec<Idiom>,
    dependencies: Vec<Idiom>,
}

impl Default for PatternCatalog {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl PatternCatalog {
    /// Built-in idioms followed by the configured ones
    pub fn with_extensions(config: &ExtractionConfig) -> Result<Self> {
        let mut catalog = Self::default();
        catalog.extend(config)?;
        Ok(catalog)
    }

    pub fn extend(&mut self, config: &ExtractionConfig) -> Result<()> {
        for spec in &config.endpoint_idioms {
            let idiom = Idiom::compile(spec)?;
            if !idiom.regex.capture_names().flatten().any(|n| n == "path") {
                return Err(Error::Configuration(format!(
                    "endpoint idiom '{}' must capture a `path` group",
                    spec.tag
                )));
            }
            self.endpoints.push(idiom);
        }
        for spec in &config.data_access_idioms {
            self.data_access.push(Idiom::compile(spec)?);
        }
        for spec in &config.dependency_tags {
            self.dependencies.push(Idiom::compile(spec)?);
        }
        Ok(())
    }

    /// Endpoint declarations in catalog order, then source order.
    pub fn find_endpoints(&self, content: &str) -> Vec<EndpointFact> {
        let mut endpoints = Vec::new();
        for idiom in &self.endpoints {
            for caps in idiom.regex.captures_iter(content) {
                let Some(path) = caps.name("path") else {
                    continue;
                };
                let method = endpoint_method(
                    caps.name("method").map(|m| m.as_str()),
                    caps.name("args").map(|m| m.as_str()).unwrap_or_default(),
                );
                endpoints.push(EndpointFact {
                    path: path.as_str().to_string(),
                    method,
                    framework: idiom.tag.clone(),
                });
            }
        }
        endpoints
    }

    pub fn find_data_access(&self, content: &str) -> Vec<DataAccessFact> {
        let mut accesses = Vec::new();
        for idiom in &self.data_access {
            for caps in idiom.regex.captures_iter(content) {
                let operation = caps
                    .name("operation")
                    .map(|m| m.as_str().to_ascii_uppercase())
                    .unwrap_or_else(|| "UNKNOWN".to_string());
                accesses.push(DataAccessFact {
                    kind: idiom.tag.clone(),
                    operation,
                    table: caps.name("table").map(|m| m.as_str().to_string()),
                });
            }
        }
        accesses
    }

    /// Tags of every dependency idiom present at least once.
    pub fn find_dependencies(&self, content: &str) -> BTreeSet<String> {
        self.dependencies
            .iter()
            .filter(|idiom| idiom.regex.is_match(content))
            .map(|idiom| idiom.tag.clone())
            .collect()
    }
}

fn endpoint_method(verb: Option<&str>, args: &str) -> String {
    match verb {
        Some(verb) if !GENERIC_ROUTE_VERBS.contains(&verb) => verb.to_ascii_uppercase(),
        _ => METHODS_ARG
            .captures(args)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_ascii_uppercase())
            .unwrap_or_else(|| "GET".to_string()),
    }
}
