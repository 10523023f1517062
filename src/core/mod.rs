pub mod errors;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;

pub use errors::{Error, Result};

// ---------------------------------------------------------------------------
// Per-file facts
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Import,
    FromImport,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportFact {
    pub module: String,
    pub alias: Option<String>,
    pub kind: ImportKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassFact {
    pub name: String,
    pub methods: Vec<String>,
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    pub line: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionFact {
    pub name: String,
    pub params: Vec<String>,
    pub decorators: Vec<String>,
    pub returns: Option<String>,
    pub line: usize,
    pub complexity: u32,
    pub is_async: bool,
}

/// An HTTP endpoint declaration, tagged with the idiom that matched it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EndpointFact {
    pub path: String,
    pub method: String,
    pub framework: String,
}

impl EndpointFact {
    pub fn is_versioned(&self) -> bool {
        self.path.contains("/v")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataAccessFact {
    pub kind: String,
    pub operation: String,
    /// `None` when the idiom does not name a table (ORM session calls etc.)
    pub table: Option<String>,
}

/// Structural facts extracted from one source file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SourceFacts {
    pub path: PathBuf,
    pub imports: Vec<ImportFact>,
    pub classes: Vec<ClassFact>,
    pub functions: Vec<FunctionFact>,
    /// Whole-file cyclomatic complexity, always >= 1
    pub complexity: u32,
    pub external_dependencies: BTreeSet<String>,
    pub endpoints: Vec<EndpointFact>,
    pub data_access: Vec<DataAccessFact>,
    /// Path-like string literals (`/x`, `http://host/x`), used to spot calls
    /// into other services
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub path_literals: BTreeSet<String>,
    /// Identifiers used anywhere other than as a definition name
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub referenced_names: BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// Architecture
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ServiceProfile {
    pub name: String,
    pub path: PathBuf,
    pub files: Vec<PathBuf>,
    pub total_complexity: u32,
    pub endpoints: Vec<EndpointFact>,
    pub tables: BTreeSet<String>,
    pub external_dependencies: BTreeSet<String>,
}

impl ServiceProfile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Fold one file's facts into the running totals.
    pub fn absorb(&mut self, facts: &SourceFacts) {
        self.files.push(facts.path.clone());
        self.total_complexity += facts.complexity;
        self.endpoints.extend(facts.endpoints.iter().cloned());
        self.tables.extend(
            facts
                .data_access
                .iter()
                .filter_map(|access| access.table.clone()),
        );
        self.external_dependencies
            .extend(facts.external_dependencies.iter().cloned());
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn avg_file_complexity(&self) -> f64 {
        self.total_complexity as f64 / self.file_count().max(1) as f64
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Api,
    Database,
    MessageQueue,
    SharedLib,
}

/// Directed edge `source -> target`: the source service calls the target.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ServiceDependency {
    pub source: String,
    pub target: String,
    #[serde(rename = "dependency_type")]
    pub kind: DependencyKind,
    pub strength: f64,
    pub calls: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn weight(self) -> u32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        static DISPLAY_STRINGS: &[(Severity, &str)] = &[
            (Severity::Low, "low"),
            (Severity::Medium, "medium"),
            (Severity::High, "high"),
            (Severity::Critical, "critical"),
        ];

        DISPLAY_STRINGS
            .iter()
            .find(|(s, _)| *s == self)
            .map(|(_, s)| *s)
            .unwrap_or("unknown")
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SmellType {
    GodService,
    HighComplexity,
    SharedDatabase,
    DeadCode,
}

impl SmellType {
    pub fn as_str(self) -> &'static str {
        match self {
            SmellType::GodService => "god_service",
            SmellType::HighComplexity => "high_complexity",
            SmellType::SharedDatabase => "shared_database",
            SmellType::DeadCode => "dead_code",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CodeSmell {
    #[serde(rename = "type")]
    pub smell_type: SmellType,
    pub severity: Severity,
    pub location: String,
    pub description: String,
    pub suggested_fix: Option<String>,
    /// Hours
    pub effort_estimate: Option<u32>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskAreaKind {
    HighCoupling,
    SinglePointOfFailure,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskArea {
    #[serde(rename = "type")]
    pub kind: RiskAreaKind,
    pub service: String,
    pub risk_score: f64,
    pub description: String,
}

/// Output of one `analyze_architecture` call. Read-only once produced.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ArchitectureAnalysis {
    pub services: BTreeMap<String, ServiceProfile>,
    pub dependencies: Vec<ServiceDependency>,
    pub code_smells: Vec<CodeSmell>,
    pub metrics: BTreeMap<String, f64>,
    pub recommendations: Vec<String>,
    pub risk_areas: Vec<RiskArea>,
}

impl ArchitectureAnalysis {
    /// Metric value, or 0.0 when the metric was not computed
    pub fn metric(&self, name: &str) -> f64 {
        self.metrics.get(name).copied().unwrap_or(0.0)
    }

    pub fn smells_of(&self, smell_type: SmellType) -> impl Iterator<Item = &CodeSmell> {
        self.code_smells
            .iter()
            .filter(move |smell| smell.smell_type == smell_type)
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RefactorType {
    ExtractService,
    MergeServices,
    SplitService,
    Rename,
    Restructure,
    DependencyInjection,
    InterfaceExtraction,
    DatabaseMigration,
    ApiVersioning,
    RemoveDeadCode,
}

impl RefactorType {
    pub fn as_str(self) -> &'static str {
        static TAGS: &[(RefactorType, &str)] = &[
            (RefactorType::ExtractService, "extract_service"),
            (RefactorType::MergeServices, "merge_services"),
            (RefactorType::SplitService, "split_service"),
            (RefactorType::Rename, "rename"),
            (RefactorType::Restructure, "restructure"),
            (RefactorType::DependencyInjection, "dependency_injection"),
            (RefactorType::InterfaceExtraction, "interface_extraction"),
            (RefactorType::DatabaseMigration, "database_migration"),
            (RefactorType::ApiVersioning, "api_versioning"),
            (RefactorType::RemoveDeadCode, "remove_dead_code"),
        ];

        TAGS.iter()
            .find(|(t, _)| *t == self)
            .map(|(_, s)| *s)
            .unwrap_or("unknown")
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Contribution to a plan's total risk score
    pub fn score(self) -> u32 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Low,
    Medium,
    #[default]
    High,
}

impl FromStr for SafetyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(SafetyLevel::Low),
            "medium" => Ok(SafetyLevel::Medium),
            "high" => Ok(SafetyLevel::High),
            other => Err(Error::Configuration(format!(
                "unknown safety level '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

impl std::fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SafetyLevel::Low => "low",
            SafetyLevel::Medium => "medium",
            SafetyLevel::High => "high",
        };
        write!(f, "{s}")
    }
}

/// Architecture style a plan migrates towards. Unknown names fall back to
/// smell-driven improvements.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TargetArchitecture {
    #[serde(rename = "domain-driven")]
    DomainDriven,
    #[serde(rename = "event-driven")]
    EventDriven,
    #[serde(rename = "microservices")]
    Microservices,
    #[default]
    #[serde(rename = "generic-smell-driven")]
    GenericSmellDriven,
}

impl TargetArchitecture {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetArchitecture::DomainDriven => "domain-driven",
            TargetArchitecture::EventDriven => "event-driven",
            TargetArchitecture::Microservices => "microservices",
            TargetArchitecture::GenericSmellDriven => "generic-smell-driven",
        }
    }
}

impl FromStr for TargetArchitecture {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "domain-driven" => TargetArchitecture::DomainDriven,
            "event-driven" => TargetArchitecture::EventDriven,
            "microservices" => TargetArchitecture::Microservices,
            _ => TargetArchitecture::GenericSmellDriven,
        })
    }
}

impl std::fmt::Display for TargetArchitecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RefactorStep {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: RefactorType,
    pub description: String,
    pub target_files: Vec<String>,
    /// Step ids, or prefixes ending in `*` matching every step with that prefix
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Hours
    pub estimated_effort: u32,
    pub risk_level: RiskLevel,
    pub rollback_strategy: Option<String>,
    #[serde(default)]
    pub validation_steps: Vec<String>,
    pub commit_message: Option<String>,
}

/// Wildcard prefix of a dependency entry, if it is one.
pub fn wildcard_prefix(dependency: &str) -> Option<&str> {
    dependency.strip_suffix('*')
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct RiskAssessment {
    pub risk_distribution: BTreeMap<String, usize>,
    pub high_risk_count: usize,
    pub total_risk_score: u32,
    pub mitigation_strategies: Vec<String>,
    pub critical_paths: Vec<Vec<String>>,
    pub dependency_cycle: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RefactorPlan {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub target_architecture: TargetArchitecture,
    pub safety_level: SafetyLevel,
    pub steps: Vec<RefactorStep>,
    /// Hours, sum of step efforts
    pub total_effort: u32,
    pub risk_assessment: RiskAssessment,
    pub success_criteria: Vec<String>,
    pub rollback_plan: Option<String>,
    /// Set when the step graph is cyclic and `steps` kept generation order
    /// instead of dependency order.
    pub dependency_cycle: bool,
}

impl RefactorPlan {
    pub fn step(&self, id: &str) -> Option<&RefactorStep> {
        self.steps.iter().find(|step| step.id == id)
    }
}

// ---------------------------------------------------------------------------
// Regression risk
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    ApiChange,
    BehaviorChange,
    Performance,
    Security,
}

impl RiskType {
    pub fn weight(self) -> u32 {
        match self {
            RiskType::Security => 4,
            RiskType::ApiChange => 3,
            RiskType::BehaviorChange => 2,
            RiskType::Performance => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskType::ApiChange => "api_change",
            RiskType::BehaviorChange => "behavior_change",
            RiskType::Performance => "performance",
            RiskType::Security => "security",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegressionRisk {
    #[serde(rename = "type")]
    pub risk_type: RiskType,
    pub severity: Severity,
    pub description: String,
    pub affected_components: Vec<String>,
    pub mitigation: Option<String>,
    #[serde(default)]
    pub test_suggestions: Vec<String>,
}

impl RegressionRisk {
    /// Sort key: `severity_weight * 10 + type_weight`
    pub fn priority(&self) -> u32 {
        self.severity.weight() * 10 + self.risk_type.weight()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
    Rename,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LineChanges {
    pub added: usize,
    pub removed: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeChange {
    pub file_path: String,
    pub change_type: ChangeType,
    /// Unified diff text
    pub diff: String,
    #[serde(default)]
    pub line_changes: LineChanges,
    #[serde(default)]
    pub semantic_changes: Vec<String>,
}
