use super::CommandContext;
use crate::analysis::{discover_services, ArchitectureAnalyzer};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

pub struct AnalyzeConfig {
    pub path: PathBuf,
    /// Explicit services; discovery under `path` runs when empty
    pub services: Vec<(String, PathBuf)>,
    pub jobs: Option<usize>,
    pub save: bool,
}

pub fn handle_analyze(ctx: &CommandContext, config: AnalyzeConfig) -> Result<()> {
    let services: BTreeMap<String, PathBuf> = if config.services.is_empty() {
        discover_services(&config.path, &ctx.config.discovery.patterns)
            .with_context(|| format!("Failed to discover services under {}", config.path.display()))?
    } else {
        config.services.into_iter().collect()
    };
    if services.is_empty() {
        warn!(path = %config.path.display(), "No services found");
    }

    let mut analyzer =
        ArchitectureAnalyzer::from_config(&ctx.config).context("Invalid extraction patterns")?;
    if let Some(jobs) = config.jobs {
        analyzer = analyzer.with_jobs(jobs);
    }

    let analysis = analyzer.analyze(&services);

    if config.save {
        let path = ctx.store().save_analysis(&analysis)?;
        eprintln!("Saved analysis to {}", path.display());
    }

    ctx.writer().write_analysis(&analysis)
}
