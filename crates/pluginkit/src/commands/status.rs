//! Enable and disable commands

use anyhow::{Context, Result};
use pluginkit_core::CancellationToken;

use crate::context::AppContext;
use crate::output;

pub(super) async fn run(
    ctx: &AppContext,
    name: &str,
    enable: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let manager = ctx.manager()?;
    let result = if enable {
        manager.enable(cancel, name).await
    } else {
        manager.disable(cancel, name).await
    };
    let record = result.with_context(|| format!("Failed to update {}", name))?;

    let status = record
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    output::success(&format!("{} is {}", record.name, status));
    Ok(())
}
