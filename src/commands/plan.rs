use super::CommandContext;
use crate::core::{ArchitectureAnalysis, SafetyLevel, TargetArchitecture};
use crate::io::read_json;
use crate::planning::create_plan;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct PlanConfig {
    /// Defaults to the latest saved analysis
    pub analysis: Option<PathBuf>,
    pub target: Option<TargetArchitecture>,
    pub safety: Option<SafetyLevel>,
    pub priorities: Vec<String>,
    pub save: bool,
}

pub fn handle_plan(ctx: &CommandContext, config: PlanConfig) -> Result<()> {
    let store = ctx.store();
    let analysis_path = match config.analysis {
        Some(path) => path,
        None => store.latest_analysis()?.with_context(|| {
            format!(
                "No saved analysis under {}; run `servicemap analyze --save` or pass --analysis",
                store.root().display()
            )
        })?,
    };
    let analysis: ArchitectureAnalysis = read_json(&analysis_path)?;

    let defaults = &ctx.config.planning;
    let priorities = if config.priorities.is_empty() {
        defaults.priorities.clone()
    } else {
        config.priorities
    };
    let plan = create_plan(
        Some(&analysis),
        config.target.unwrap_or(defaults.target_architecture),
        config.safety.unwrap_or(defaults.safety_level),
        (!priorities.is_empty()).then_some(priorities.as_slice()),
    )?;

    if config.save {
        let path = store.save_plan(&plan)?;
        eprintln!("Saved plan to {}", path.display());
    }

    ctx.writer().write_plan(&plan)
}
