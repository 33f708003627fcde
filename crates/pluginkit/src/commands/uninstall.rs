//! Uninstall command

use anyhow::{Context, Result};
use dialoguer::Confirm;
use pluginkit_core::CancellationToken;

use crate::cli::UninstallArgs;
use crate::context::AppContext;
use crate::output;

/// Remove an installed plugin
///
/// - With confirmation: `pluginkit uninstall hello`
/// - Without: `pluginkit uninstall hello -y`
pub(super) async fn run(
    ctx: &AppContext,
    args: &UninstallArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let manager = ctx.manager()?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove {} and all its files?", args.name))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Uninstall cancelled");
            return Ok(());
        }
    }

    manager
        .uninstall(cancel, &args.name)
        .await
        .with_context(|| format!("Failed to uninstall {}", args.name))?;
    output::success(&format!("Uninstalled {}", args.name));
    Ok(())
}
