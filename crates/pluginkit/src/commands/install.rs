//! Install command

use anyhow::{Context, Result};
use pluginkit_core::CancellationToken;

use super::requested_version;
use crate::cli::InstallArgs;
use crate::context::AppContext;
use crate::output;

pub(super) async fn run(
    ctx: &AppContext,
    args: &InstallArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let manager = ctx.manager()?;
    let version = requested_version(args.version.as_deref());

    let spinner = output::spinner(&format!("Installing {} ({})", args.name, version));
    let result = manager.install(cancel, &args.name, version).await;
    spinner.finish_and_clear();

    let record = result.with_context(|| format!("Failed to install {}", args.name))?;
    output::success(&format!("Installed {} {}", record.name, record.version));
    output::kv(
        "Location",
        &manager.plugin_path(&record.name).display().to_string(),
    );
    Ok(())
}
