use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetStyle {
    DomainDriven,
    EventDriven,
    Microservices,
    GenericSmellDriven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Safety {
    Low,
    Medium,
    High,
}

#[derive(Parser, Debug)]
#[command(name = "servicemap")]
#[command(
    about = "Service architecture analyzer, refactor planner and regression risk classifier",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the nearest .servicemap.toml)
    #[arg(long, global = true, env = "SERVICEMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Print JSON instead of the terminal summary
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the services of a codebase
    Analyze {
        /// Codebase root; services are discovered under it unless given explicitly
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Explicit service as NAME=PATH (repeatable)
        #[arg(long = "service", value_parser = parse_service)]
        services: Vec<(String, PathBuf)>,

        /// Worker threads for extraction (0 = all CPUs)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Save the analysis under the output directory
        #[arg(long)]
        save: bool,
    },

    /// Create a refactor plan from a saved analysis
    Plan {
        /// Analysis JSON file (defaults to the latest saved analysis)
        #[arg(long)]
        analysis: Option<PathBuf>,

        /// Target architecture style
        #[arg(long, value_enum)]
        target: Option<TargetStyle>,

        /// Safety level
        #[arg(long, value_enum)]
        safety: Option<Safety>,

        /// Priority keyword, most important first (repeatable)
        #[arg(long = "priority")]
        priorities: Vec<String>,

        /// Save the plan under the output directory
        #[arg(long)]
        save: bool,
    },

    /// Classify regression risks of a batch of code changes
    Classify {
        /// JSON list of code changes
        #[arg(long, conflicts_with = "step")]
        changes: Option<PathBuf>,

        /// Saved plan id to simulate a step from
        #[arg(long, requires = "step")]
        plan: Option<String>,

        /// Step id within --plan; its changes are simulated
        #[arg(long, requires = "plan")]
        step: Option<String>,

        /// Print a markdown report for the step instead of the summary
        #[arg(long)]
        report: bool,

        /// Save the risk list under the output directory
        #[arg(long)]
        save: bool,
    },

    /// List migration strategies
    Strategies {
        /// Show only the strategy recommended for this safety level
        #[arg(long, value_enum)]
        safety: Option<Safety>,
    },

    /// Write a default .servicemap.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_service(value: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{value}'"))?;
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=PATH, got '{value}'"));
    }
    Ok((name.to_string(), PathBuf::from(path)))
}

impl From<TargetStyle> for crate::core::TargetArchitecture {
    fn from(style: TargetStyle) -> Self {
        match style {
            TargetStyle::DomainDriven => Self::DomainDriven,
            TargetStyle::EventDriven => Self::EventDriven,
            TargetStyle::Microservices => Self::Microservices,
            TargetStyle::GenericSmellDriven => Self::GenericSmellDriven,
        }
    }
}

impl From<Safety> for crate::core::SafetyLevel {
    fn from(safety: Safety) -> Self {
        match safety {
            Safety::Low => Self::Low,
            Safety::Medium => Self::Medium,
            Safety::High => Self::High,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan_arguments() {
        let cli = Cli::parse_from([
            "servicemap",
            "plan",
            "--target",
            "event-driven",
            "--safety",
            "medium",
            "--priority",
            "database",
            "--priority",
            "split",
            "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Plan {
                target,
                safety,
                priorities,
                ..
            } => {
                assert_eq!(target, Some(TargetStyle::EventDriven));
                assert_eq!(safety, Some(Safety::Medium));
                assert_eq!(priorities, vec!["database", "split"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_service_argument() {
        assert_eq!(
            parse_service("users=services/users-service"),
            Ok(("users".to_string(), PathBuf::from("services/users-service")))
        );
        assert!(parse_service("users").is_err());
        assert!(parse_service("=path").is_err());
    }
}
