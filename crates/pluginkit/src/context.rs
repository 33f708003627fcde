//! Wiring: configuration, backend registry and lifecycle manager

use anyhow::{Context, Result};
use pluginkit_catalog::{GitHubCatalog, LocalCatalog};
use pluginkit_core::utils::expand_home;
use pluginkit_core::{Catalog, ConfigLoader, PluginkitConfig, Registry};
use pluginkit_manager::LifecycleManager;
use pluginkit_runtime::NativeExecutor;
use std::sync::Arc;
use tracing::debug;

use crate::cli::Cli;

/// Everything a command needs, built once per invocation
pub struct AppContext {
    pub config: PluginkitConfig,
    pub registry: Registry,
}

impl AppContext {
    /// Load configuration and apply the global CLI overrides
    pub fn load(cli: &Cli) -> Result<Self> {
        let loader = ConfigLoader::new().context("Failed to locate configuration directory")?;
        let mut config = match &cli.config {
            Some(path) => loader.load_file(path),
            None => loader.load(),
        }
        .context("Failed to load configuration")?;

        if let Some(dir) = &cli.plugin_dir {
            config.plugin_dir = expand_home(dir.as_std_path())?;
        }
        if let Some(catalog) = &cli.catalog {
            config.catalog = catalog.clone();
        }

        let registry = build_registry(&config)?;
        Ok(Self { config, registry })
    }

    /// Manager over the configured plugin root and selected catalog
    pub fn manager(&self) -> Result<LifecycleManager> {
        let catalog = self
            .registry
            .catalog(&self.config.catalog)
            .with_context(|| {
                format!(
                    "Catalog '{}' is not available (configured: {})",
                    self.config.catalog,
                    self.registry.catalog_ids().join(", ")
                )
            })?;
        Ok(LifecycleManager::new(&self.config.plugin_dir, catalog))
    }
}

/// Register every catalog whose settings are complete, plus the native executor
pub fn build_registry(config: &PluginkitConfig) -> Result<Registry> {
    let mut registry = Registry::new();

    let mut github = GitHubCatalog::new(&config.http)?;
    if configure(&mut github, config) {
        registry.register_catalog(Arc::new(github));
    }

    let mut local = LocalCatalog::new();
    if configure(&mut local, config) {
        registry.register_catalog(Arc::new(local));
    }

    registry.register_executor(Arc::new(NativeExecutor::new(&config.plugin_dir)));
    Ok(registry)
}

fn configure(catalog: &mut dyn Catalog, config: &PluginkitConfig) -> bool {
    let settings = config.catalog_settings(catalog.id());
    match catalog.setup(&settings) {
        Ok(()) => true,
        Err(e) => {
            debug!("Catalog {} not configured: {}", catalog.id(), e);
            false
        }
    }
}
