//! CLI command implementations.
//!
//! Each submodule maps the parsed arguments of one subcommand onto the
//! library entry points; none of them holds analysis logic of its own.
//!
//! Available commands:
//! - **analyze**: profile services and derive the architecture analysis
//! - **plan**: turn a saved analysis into an ordered refactor plan
//! - **classify**: classify regression risks of a batch of changes
//! - **strategies**: list whole-system migration strategies
//! - **init**: write a default `.servicemap.toml`

pub mod analyze;
pub mod classify;
pub mod init;
pub mod plan;
pub mod strategies;

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use classify::{handle_classify, ClassifyConfig};
pub use init::init_config;
pub use plan::{handle_plan, PlanConfig};
pub use strategies::handle_strategies;

use crate::config::{load_config, load_config_from, ServicemapConfig};
use crate::io::{create_writer, OutputFormat, OutputWriter, ResultStore};
use anyhow::{Context, Result};
use std::path::Path;

/// Settings shared by every command
pub struct CommandContext {
    pub config: ServicemapConfig,
    pub format: OutputFormat,
}

impl CommandContext {
    /// An explicit config file must load; otherwise the nearest
    /// `.servicemap.toml` is used, falling back to defaults.
    pub fn load(config_path: Option<&Path>, json: bool) -> Result<Self> {
        let config = match config_path {
            Some(path) => load_config_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                load_config(&cwd)
            }
        };
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Terminal
        };
        Ok(Self { config, format })
    }

    pub fn store(&self) -> ResultStore {
        ResultStore::new(&self.config.output.directory)
    }

    pub fn writer(&self) -> Box<dyn OutputWriter> {
        create_writer(self.format)
    }
}
