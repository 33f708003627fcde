//! Command implementations
//!
//! - install / uninstall / upgrade: lifecycle mutations
//! - enable / disable: flip an installed plugin's status
//! - list / search / info: read-only views
//! - run: execute an installed plugin
//! - extract: run the extraction pipeline on a local file

mod extract;
mod info;
mod install;
mod list;
mod run;
mod search;
mod status;
mod uninstall;
mod upgrade;

use anyhow::Result;
use pluginkit_core::CancellationToken;

use crate::cli::{Cli, Commands};
use crate::context::AppContext;

/// Dispatch a parsed command line
pub async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    if let Commands::Extract(args) = &cli.command {
        return extract::run(args, &cancel);
    }

    let ctx = AppContext::load(&cli)?;
    match &cli.command {
        Commands::Install(args) => install::run(&ctx, args, &cancel).await,
        Commands::Uninstall(args) => uninstall::run(&ctx, args, &cancel).await,
        Commands::Enable(args) => status::run(&ctx, &args.name, true, &cancel).await,
        Commands::Disable(args) => status::run(&ctx, &args.name, false, &cancel).await,
        Commands::List(args) => list::run(&ctx, args, &cancel).await,
        Commands::Search(args) => search::run(&ctx, args, &cancel).await,
        Commands::Upgrade(args) => upgrade::run(&ctx, args, &cancel).await,
        Commands::Info(args) => info::run(&ctx, args).await,
        Commands::Run(args) => run::run(&ctx, args, &cancel).await,
        Commands::Extract(args) => extract::run(args, &cancel),
    }
}

/// Requested version, `latest` when omitted
fn requested_version(version: Option<&str>) -> &str {
    version.unwrap_or("latest")
}
