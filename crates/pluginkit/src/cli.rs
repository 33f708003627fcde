//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// pluginkit - install, upgrade and run plugins from release catalogs
#[derive(Parser, Debug)]
#[command(name = "pluginkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a config.yaml to use instead of ~/.pluginkit/config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Plugin root directory
    #[arg(long, global = true)]
    pub plugin_dir: Option<Utf8PathBuf>,

    /// Catalog to fetch plugins from (github, local)
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a plugin
    Install(InstallArgs),

    /// Remove an installed plugin
    Uninstall(UninstallArgs),

    /// Enable an installed plugin
    Enable(NameArgs),

    /// Disable an installed plugin
    Disable(NameArgs),

    /// List installed plugins
    List(ListArgs),

    /// Search the catalog
    Search(SearchArgs),

    /// Upgrade an installed plugin
    Upgrade(UpgradeArgs),

    /// Show an installed plugin's record
    Info(InfoArgs),

    /// Run an installed plugin
    Run(RunArgs),

    /// Extract an archive the way plugin installs do
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Plugin name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Plugin name
    pub name: String,

    /// Version to install (default: latest)
    #[arg(long)]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Plugin name
    pub name: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to narrow the search
    pub query: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Plugin name
    pub name: String,

    /// Target version (default: latest)
    #[arg(long)]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Plugin name
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Plugin name
    pub name: String,

    /// Working directory for the plugin
    #[arg(long)]
    pub cwd: Option<Utf8PathBuf>,

    /// Arguments passed to the plugin
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Archive or binary to extract
    pub file: Utf8PathBuf,

    /// Destination directory
    pub dest: Utf8PathBuf,

    /// Force a format instead of sniffing (gzip, zip, xz, bzip2, lz4, brotli, zstd, tar)
    #[arg(long)]
    pub format: Option<String>,
}
