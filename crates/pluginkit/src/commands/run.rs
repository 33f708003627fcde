//! Run command

use anyhow::{Context, Result};
use pluginkit_core::{CancellationToken, ExecuteOptions};
use std::io::Write;
use tracing::debug;

use crate::cli::RunArgs;
use crate::context::AppContext;

/// Run an installed plugin with the executor matching its runtime and exit
/// with the plugin's exit code
pub(super) async fn run(
    ctx: &AppContext,
    args: &RunArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let manager = ctx.manager()?;
    let record = manager
        .get(&args.name)
        .await
        .with_context(|| format!("Failed to read {}", args.name))?;

    let executor = ctx
        .registry
        .executor(&record.runtime_id)
        .with_context(|| format!("No executor for {} plugins", record.runtime_id))?;

    let options = ExecuteOptions {
        args: args.args.clone(),
        environment: None,
        working_dir: args.cwd.as_ref().map(|d| d.clone().into_std_path_buf()),
    };
    let result = executor
        .execute(cancel, &args.name, options)
        .await
        .with_context(|| format!("Failed to run {}", args.name))?;
    debug!(
        "{} (pid {:?}) finished in {:?}",
        result.command_line, result.pid, result.duration
    );

    std::io::stdout().write_all(&result.stdout)?;
    std::io::stderr().write_all(&result.stderr)?;
    std::io::stdout().flush()?;

    if !result.success {
        std::process::exit(result.exit_code);
    }
    Ok(())
}
