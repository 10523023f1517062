//! servicemap: architecture analysis, refactor planning and regression risk
//! classification for service-oriented Python codebases.
//!
//! The four entry points are re-exported here:
//!
//! - [`extract_file`]: structural facts of one source file
//! - [`analyze_architecture`]: service profiles, dependencies, smells and metrics
//! - [`create_plan`]: an ordered, risk-assessed refactor plan
//! - [`classify_regression_risks`]: typed, ranked risks of a batch of diffs

pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod extraction;
pub mod io;
pub mod planning;
pub mod regression;

pub use crate::core::{
    ArchitectureAnalysis, ChangeType, CodeChange, CodeSmell, DependencyKind, Error,
    RefactorPlan, RefactorStep, RefactorType, RegressionRisk, Result, RiskAssessment, RiskLevel,
    RiskType, SafetyLevel, ServiceDependency, ServiceProfile, Severity, SmellType, SourceFacts,
    TargetArchitecture,
};

pub use crate::analysis::{analyze_architecture, discover_services, ArchitectureAnalyzer};
pub use crate::config::{load_config, ServicemapConfig};
pub use crate::extraction::{extract_file, Extractor};
pub use crate::io::ResultStore;
pub use crate::planning::{create_plan, RefactorPlanner};
pub use crate::regression::{classify_regression_risks, simulate_changes, ClassifyContext};
