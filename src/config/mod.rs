//! `.servicemap.toml` configuration
//!
//! Every section is optional; missing fields take the defaults below, which
//! equal the built-in analysis thresholds.

mod loader;

pub use loader::{directory_ancestors, load_config, load_config_from, parse_config};

use crate::core::{SafetyLevel, TargetArchitecture};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = ".servicemap.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServicemapConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub parallel: ParallelConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

fn default_god_service_endpoints() -> usize {
    20
}

fn default_complexity_per_file() -> f64 {
    10.0
}

fn default_api_dependency_strength() -> f64 {
    0.7
}

fn default_max_service_complexity() -> u32 {
    100
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_exclude_dirs() -> Vec<String> {
    [".git", "__pycache__", ".venv", "venv", "node_modules", ".tox"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Thresholds and file selection for architecture analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// A service with more endpoints than this is a god service
    #[serde(default = "default_god_service_endpoints")]
    pub god_service_endpoints: usize,

    /// Average complexity per file above which a service is flagged
    #[serde(default = "default_complexity_per_file")]
    pub complexity_per_file: f64,

    /// Strength assigned to inferred API edges
    #[serde(default = "default_api_dependency_strength")]
    pub api_dependency_strength: f64,

    /// Total complexity above which a split is recommended
    #[serde(default = "default_max_service_complexity")]
    pub max_service_complexity: u32,

    /// Source file extensions handed to the extractor
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names never descended into
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            god_service_endpoints: default_god_service_endpoints(),
            complexity_per_file: default_complexity_per_file(),
            api_dependency_strength: default_api_dependency_strength(),
            max_service_complexity: default_max_service_complexity(),
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

/// Worker pool used for per-file extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Number of worker threads; 0 uses every CPU
    #[serde(default)]
    pub jobs: usize,
}

impl ParallelConfig {
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get()
        } else {
            self.jobs
        }
    }
}

/// A named detection idiom: a regex tagged with the framework or system it
/// recognizes.
///
/// Endpoint idioms must capture a `path` group and may capture `method`.
/// Data-access idioms may capture `operation` and `table`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdiomSpec {
    pub tag: String,
    pub pattern: String,
}

/// Idioms appended to the built-in catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub endpoint_idioms: Vec<IdiomSpec>,
    #[serde(default)]
    pub data_access_idioms: Vec<IdiomSpec>,
    #[serde(default)]
    pub dependency_tags: Vec<IdiomSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanningConfig {
    #[serde(default)]
    pub target_architecture: TargetArchitecture,
    #[serde(default)]
    pub safety_level: SafetyLevel,
    #[serde(default)]
    pub priorities: Vec<String>,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".servicemap")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_discovery_patterns() -> Vec<String> {
    [
        "services/*",
        "microservices/*",
        "apps/*",
        "src/services/*",
        "*-service",
        "*-api",
        "*-worker",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Glob patterns, relative to the repository root, whose matching
/// directories are treated as services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryConfig {
    #[serde(default = "default_discovery_patterns")]
    pub patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            patterns: default_discovery_patterns(),
        }
    }
}
