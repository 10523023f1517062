use super::CommandContext;
use crate::core::{CodeChange, RegressionRisk};
use crate::io::read_json;
use crate::regression::{classify_regression_risks, render_report, simulate_changes, ClassifyContext};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

pub struct ClassifyConfig {
    pub changes: Option<PathBuf>,
    pub plan: Option<String>,
    pub step: Option<String>,
    pub report: bool,
    pub save: bool,
}

pub fn handle_classify(ctx: &CommandContext, config: ClassifyConfig) -> Result<()> {
    let store = ctx.store();

    let risks = match (&config.changes, &config.plan, &config.step) {
        (Some(path), _, _) => {
            let changes: Vec<CodeChange> = read_json(path)?;
            if config.report {
                bail!("--report needs a plan step; use --plan and --step");
            }
            classify_regression_risks(&changes, &ClassifyContext::default())
        }
        (None, Some(plan_id), Some(step_id)) => {
            let plan = store
                .load_plan(plan_id)
                .with_context(|| format!("Failed to load plan {plan_id}"))?;
            let step = plan
                .step(step_id)
                .with_context(|| format!("Plan {plan_id} has no step {step_id}"))?;
            let changes = simulate_changes(step);
            let risks = classify_regression_risks(&changes, &ClassifyContext::for_step(step));
            if config.report {
                println!("{}", render_report(&risks, step));
                return save_risks(ctx, &risks, config.save);
            }
            risks
        }
        _ => bail!("Pass --changes FILE, or --plan ID with --step ID"),
    };

    save_risks(ctx, &risks, config.save)?;
    ctx.writer().write_risks(&risks)
}

fn save_risks(ctx: &CommandContext, risks: &[RegressionRisk], save: bool) -> Result<()> {
    if save {
        let path = ctx.store().save_risks(risks)?;
        eprintln!("Saved risks to {}", path.display());
    }
    Ok(())
}
