//! Extract command

use anyhow::{Context, Result};
use pluginkit_core::{CancellationToken, PluginContent};
use pluginkit_extract::{ArchiveFormat, ExtractionPipeline};
use std::fs;

use crate::cli::ExtractArgs;
use crate::output;

/// Extract a local archive (or copy a raw binary) into a directory
pub(super) fn run(args: &ExtractArgs, cancel: &CancellationToken) -> Result<()> {
    let format = args
        .format
        .as_deref()
        .map(str::parse::<ArchiveFormat>)
        .transpose()?;

    let file =
        fs::File::open(&args.file).with_context(|| format!("Failed to open {}", args.file))?;
    fs::create_dir_all(&args.dest)
        .with_context(|| format!("Failed to create {}", args.dest))?;
    let file_name = args.file.file_name().unwrap_or("plugin");

    let outcome = ExtractionPipeline::new()
        .extract_as(
            cancel,
            PluginContent::from_file(file),
            args.dest.as_std_path(),
            file_name,
            format,
        )
        .with_context(|| format!("Failed to extract {}", args.file))?;

    output::success(&format!(
        "Extracted {} file(s) into {} ({})",
        outcome.files.len(),
        args.dest,
        outcome.format.map(|f| f.as_str()).unwrap_or("raw")
    ));
    for file in &outcome.files {
        tracing::debug!("  {}", file.display());
    }
    Ok(())
}
