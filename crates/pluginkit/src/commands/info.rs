//! Info command

use anyhow::{Context, Result};

use crate::cli::InfoArgs;
use crate::context::AppContext;
use crate::output;

pub(super) async fn run(ctx: &AppContext, args: &InfoArgs) -> Result<()> {
    let manager = ctx.manager()?;
    let record = manager
        .get(&args.name)
        .await
        .with_context(|| format!("Failed to read {}", args.name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    output::header(&record.name);
    output::kv("Version", &record.version);
    if let Some(status) = record.status {
        output::kv("Status", status.as_str());
    }
    if !record.description.is_empty() {
        output::kv("Description", &record.description);
    }
    output::kv("File", &record.file_name);
    output::kv("Runtime", &record.runtime_id);
    output::kv("Catalog", &record.store_id);
    output::kv(
        "Location",
        &manager.plugin_path(&record.name).display().to_string(),
    );
    for (key, value) in &record.metadata {
        output::kv(key, value);
    }
    Ok(())
}
