//! pluginkit CLI - plugin lifecycle management
//!
//! Main entry point for the `pluginkit` command-line interface.

mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use pluginkit_core::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            trigger.cancel();
        }
    });

    commands::run(cli, cancel).await
}

/// Initialize tracing with appropriate verbosity; `RUST_LOG` wins when set
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("info"),
                1 => EnvFilter::new("debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
