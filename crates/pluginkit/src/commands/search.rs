//! Search command

use anyhow::{Context, Result};
use pluginkit_core::catalog::CRITERIA_QUERY;
use pluginkit_core::types::META_INSTALLED_VERSION;
use pluginkit_core::{CancellationToken, PluginRecord, SearchCriteria};
use tabled::Tabled;

use super::list::{or_dash, wrapped_table};
use crate::cli::SearchArgs;
use crate::context::AppContext;
use crate::output;

/// Row for a catalog entry
#[derive(Tabled)]
struct SearchRow {
    name: String,
    version: String,
    status: String,
    #[tabled(rename = "installed version")]
    installed_version: String,
    runtime: String,
    description: String,
}

impl From<&PluginRecord> for SearchRow {
    fn from(record: &PluginRecord) -> Self {
        Self {
            name: record.name.clone(),
            version: or_dash(&record.version),
            status: record
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            installed_version: record
                .metadata
                .get(META_INSTALLED_VERSION)
                .cloned()
                .unwrap_or_else(|| "-".to_string()),
            runtime: or_dash(&record.runtime_id),
            description: or_dash(&record.description),
        }
    }
}

/// Search the configured catalog
///
/// - Everything: `pluginkit search`
/// - Narrowed: `pluginkit search json`
pub(super) async fn run(
    ctx: &AppContext,
    args: &SearchArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let manager = ctx.manager()?;
    let mut criteria = SearchCriteria::new();
    if let Some(query) = &args.query {
        criteria.insert(CRITERIA_QUERY.to_string(), query.clone());
    }

    let spinner = output::spinner(&format!("Searching {}", manager.catalog().id()));
    let result = manager.search(cancel, &criteria).await;
    spinner.finish_and_clear();
    let records = result.context("Search failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        output::info("No plugins found");
        return Ok(());
    }

    let rows: Vec<SearchRow> = records.iter().map(SearchRow::from).collect();
    println!("{}", wrapped_table(rows, 5));
    output::info(&format!("{} plugin(s) found", records.len()));
    Ok(())
}
