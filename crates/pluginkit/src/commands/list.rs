//! List command

use anyhow::{Context, Result};
use pluginkit_core::{CancellationToken, PluginRecord};
use tabled::{
    settings::{object::Columns, Modify, Style, Width},
    Table, Tabled,
};

use crate::cli::ListArgs;
use crate::context::AppContext;
use crate::output;

/// Row for an installed plugin
#[derive(Tabled)]
struct InstalledRow {
    name: String,
    version: String,
    status: String,
    runtime: String,
    catalog: String,
    #[tabled(rename = "install date")]
    install_date: String,
}

impl From<&PluginRecord> for InstalledRow {
    fn from(record: &PluginRecord) -> Self {
        Self {
            name: record.name.clone(),
            version: record.version.clone(),
            status: record
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            runtime: or_dash(&record.runtime_id),
            catalog: or_dash(&record.store_id),
            install_date: record
                .installed_at()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub(super) fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// List installed plugins
///
/// - Table: `pluginkit list`
/// - JSON records: `pluginkit list --json`
pub(super) async fn run(
    ctx: &AppContext,
    args: &ListArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let manager = ctx.manager()?;
    let records = manager
        .list(cancel)
        .await
        .context("Failed to list installed plugins")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        output::info(&format!(
            "No plugins installed in {}",
            manager.root().display()
        ));
        return Ok(());
    }

    let rows: Vec<InstalledRow> = records.iter().map(InstalledRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);
    output::info(&format!("{} plugin(s) installed", records.len()));
    Ok(())
}

/// Table with long description columns wrapped
pub(super) fn wrapped_table<T: Tabled>(rows: Vec<T>, column: usize) -> Table {
    let mut table = Table::new(rows);
    table
        .with(Style::sharp())
        .with(Modify::new(Columns::new(column..column + 1)).with(Width::wrap(50).keep_words(true)));
    table
}
