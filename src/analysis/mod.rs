//! Architecture analysis
//!
//! Profiles every service (extraction runs on a bounded rayon pool), infers
//! API dependencies between services, and derives smells, metrics,
//! recommendations and risk areas. Per-file failures never abort a run.

pub mod discovery;
pub mod graph;
pub mod insights;
pub mod metrics;
pub mod profile;
pub mod smells;

pub use discovery::discover_services;
pub use graph::ServiceGraph;
pub use profile::{profile_service, ServiceScan};

use crate::config::{AnalysisConfig, ParallelConfig, ServicemapConfig};
use crate::core::errors::Result;
use crate::core::ArchitectureAnalysis;
use crate::extraction::{Extractor, PatternCatalog};
use crate::io::walker::{FileWalker, SourceTree};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, info_span, warn};

pub struct ArchitectureAnalyzer {
    extractor: Extractor,
    config: AnalysisConfig,
    parallel: ParallelConfig,
}

impl Default for ArchitectureAnalyzer {
    fn default() -> Self {
        Self {
            extractor: Extractor::default(),
            config: AnalysisConfig::default(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl ArchitectureAnalyzer {
    /// Analyzer with thresholds, extra idioms and worker count from `config`
    pub fn from_config(config: &ServicemapConfig) -> Result<Self> {
        let catalog = PatternCatalog::with_extensions(&config.extraction)?;
        Ok(Self {
            extractor: Extractor::new(catalog),
            config: config.analysis.clone(),
            parallel: config.parallel.clone(),
        })
    }

    /// Override the worker count; 0 uses every CPU
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.parallel.jobs = jobs;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze services on the real file system
    pub fn analyze(&self, services: &BTreeMap<String, PathBuf>) -> ArchitectureAnalysis {
        self.analyze_tree(services, &FileWalker::from_config(&self.config))
    }

    pub fn analyze_tree(
        &self,
        services: &BTreeMap<String, PathBuf>,
        tree: &dyn SourceTree,
    ) -> ArchitectureAnalysis {
        let _span = info_span!("analyze_architecture", services = services.len()).entered();

        let scans = self.run_in_pool(|| {
            services
                .iter()
                .map(|(name, root)| {
                    (
                        name.clone(),
                        profile_service(name, root, tree, &self.extractor),
                    )
                })
                .collect::<BTreeMap<_, _>>()
        });

        let analysis = self.analyze_scans(&scans);
        info!(
            services = analysis.services.len(),
            dependencies = analysis.dependencies.len(),
            smells = analysis.code_smells.len(),
            "architecture analysis complete"
        );
        analysis
    }

    /// Derive the analysis from already profiled services.
    pub fn analyze_scans(&self, scans: &BTreeMap<String, ServiceScan>) -> ArchitectureAnalysis {
        let dependencies =
            graph::infer_api_dependencies(scans, self.config.api_dependency_strength);
        let code_smells = smells::detect_smells(scans, &self.config);
        let services: BTreeMap<_, _> = scans
            .iter()
            .map(|(name, scan)| (name.clone(), scan.profile.clone()))
            .collect();

        let graph = ServiceGraph::build(services.keys(), &dependencies);
        let metrics = metrics::calculate_metrics(&services, &dependencies, &graph);
        let recommendations = insights::generate_recommendations(&services, &graph, &self.config);
        let risk_areas = insights::identify_risk_areas(&services, &graph);

        ArchitectureAnalysis {
            services,
            dependencies,
            code_smells,
            metrics,
            recommendations,
            risk_areas,
        }
    }

    fn run_in_pool<T: Send>(&self, work: impl FnOnce() -> T + Send) -> T {
        let threads = self.parallel.effective_jobs();
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(work),
            Err(e) => {
                warn!("Failed to build worker pool ({}), using the global pool", e);
                work()
            }
        }
    }
}

/// Analyze services with default thresholds and the built-in idioms
pub fn analyze_architecture(services: &BTreeMap<String, PathBuf>) -> ArchitectureAnalysis {
    ArchitectureAnalyzer::default().analyze(services)
}
