use super::CommandContext;
use crate::core::SafetyLevel;
use crate::planning::{catalog, recommend_strategy};
use anyhow::Result;

pub fn handle_strategies(ctx: &CommandContext, safety: Option<SafetyLevel>) -> Result<()> {
    let strategies = match safety {
        Some(level) => vec![recommend_strategy(level)],
        None => catalog(),
    };
    ctx.writer().write_strategies(&strategies)
}
