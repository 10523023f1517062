use anyhow::Result;
use clap::Parser;
use servicemap::cli::{Cli, Commands};
use servicemap::commands::{
    self, AnalyzeConfig, ClassifyConfig, CommandContext, PlanConfig,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("servicemap={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    // init runs before any configuration exists, so the context loads per command
    let context = || CommandContext::load(cli.config.as_deref(), cli.json);

    match cli.command {
        Commands::Init { force } => commands::init_config(force),
        Commands::Analyze {
            path,
            services,
            jobs,
            save,
        } => commands::handle_analyze(
            &context()?,
            AnalyzeConfig {
                path,
                services,
                jobs,
                save,
            },
        ),
        Commands::Plan {
            analysis,
            target,
            safety,
            priorities,
            save,
        } => commands::handle_plan(
            &context()?,
            PlanConfig {
                analysis,
                target: target.map(Into::into),
                safety: safety.map(Into::into),
                priorities,
                save,
            },
        ),
        Commands::Classify {
            changes,
            plan,
            step,
            report,
            save,
        } => commands::handle_classify(
            &context()?,
            ClassifyConfig {
                changes,
                plan,
                step,
                report,
                save,
            },
        ),
        Commands::Strategies { safety } => {
            commands::handle_strategies(&context()?, safety.map(Into::into))
        }
    }
}
