//! Upgrade command

use anyhow::{Context, Result};
use pluginkit_core::types::META_UPGRADED_FROM;
use pluginkit_core::{CancellationToken, Error};

use super::requested_version;
use crate::cli::UpgradeArgs;
use crate::context::AppContext;
use crate::output;

pub(super) async fn run(
    ctx: &AppContext,
    args: &UpgradeArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let manager = ctx.manager()?;
    let version = requested_version(args.version.as_deref());

    let spinner = output::spinner(&format!("Upgrading {} to {}", args.name, version));
    let result = manager.upgrade(cancel, &args.name, version).await;
    spinner.finish_and_clear();

    match result {
        Ok(record) => {
            let from = record
                .metadata
                .get(META_UPGRADED_FROM)
                .map(String::as_str)
                .unwrap_or("-");
            output::success(&format!(
                "Upgraded {} from {} to {}",
                record.name, from, record.version
            ));
            Ok(())
        }
        Err(Error::AlreadyAtVersion { name, version }) => {
            output::info(&format!("{} is already at {}", name, version));
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to upgrade {}", args.name)),
    }
}
