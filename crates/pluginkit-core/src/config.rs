//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. User config (~/.pluginkit/config.yaml) or an explicit file
//! 3. Environment variables (PLUGINKIT_* prefix)
//! 4. CLI flags (handled by caller)

use crate::catalog::CatalogSettings;
use crate::error::{Error, IoResultExt, Result};
use crate::utils::{expand_home, get_home_dir};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "defaults.yaml";
const USER_CONFIG_FILE: &str = "config.yaml";

/// Resolved pluginkit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginkitConfig {
    /// Plugin root: one subdirectory per installed plugin
    pub plugin_dir: PathBuf,

    /// Id of the catalog used by install, upgrade and search
    pub catalog: String,

    /// Settings per catalog id
    #[serde(default)]
    pub catalogs: BTreeMap<String, CatalogSettings>,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            user_agent: "pluginkit".to_string(),
        }
    }
}

impl PluginkitConfig {
    /// Settings of the given catalog, empty if none are configured
    pub fn catalog_settings(&self, id: &str) -> CatalogSettings {
        self.catalogs.get(id).cloned().unwrap_or_default()
    }
}

/// Configuration hierarchy loader
pub struct ConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at ~/.pluginkit
    pub fn new() -> Result<Self> {
        let home = get_home_dir()?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|_| Error::validation("home directory is not valid UTF-8"))?;
        Ok(Self {
            config_dir: home.join(".pluginkit"),
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Load defaults, then the user config file if present, then env overrides
    pub fn load(&self) -> Result<PluginkitConfig> {
        let path = self.config_dir.join(USER_CONFIG_FILE);
        let overlay = if path.exists() {
            Some(&*path)
        } else {
            None
        };
        self.load_layers(overlay)
    }

    /// Load defaults, then `path` (which must exist), then env overrides
    pub fn load_file(&self, path: &Utf8Path) -> Result<PluginkitConfig> {
        if !path.exists() {
            return Err(Error::validation(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        self.load_layers(Some(path))
    }

    fn load_layers(&self, overlay: Option<&Utf8Path>) -> Result<PluginkitConfig> {
        let mut value = Self::load_embedded_value(DEFAULTS_FILE)?;

        if let Some(path) = overlay {
            debug!("Loading configuration from {}", path);
            let file_value = Self::load_yaml_file(path)?;
            merge_values(&mut value, file_value);
        }

        let config: PluginkitConfig = serde_yaml_ng::from_value(value)
            .map_err(|e| Error::validation(format!("Failed to parse configuration: {}", e)))?;

        let mut config = Self::apply_env_overrides(config)?;
        config.plugin_dir = expand_home(&config.plugin_dir)?;
        for settings in config.catalogs.values_mut() {
            if let Some(path) = settings.get_mut("path") {
                *path = expand_home(std::path::Path::new(path.as_str()))?
                    .to_string_lossy()
                    .into_owned();
            }
        }
        Ok(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_value(filename: &str) -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::validation(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::validation(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::validation(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Load a YAML file and parse it
    fn load_yaml_file(path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path).io_context(format!("reading {}", path))?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::validation(format!("Failed to parse {}: {}", path, e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: PluginkitConfig) -> Result<PluginkitConfig> {
        if let Ok(val) = env::var("PLUGINKIT_PLUGIN_DIR") {
            config.plugin_dir = PathBuf::from(val);
        }

        if let Ok(val) = env::var("PLUGINKIT_CATALOG") {
            config.catalog = val;
        }

        if let Ok(val) = env::var("PLUGINKIT_GITHUB_TOKEN") {
            config
                .catalogs
                .entry("github".to_string())
                .or_default()
                .insert("token".to_string(), val);
        }

        if let Ok(val) = env::var("PLUGINKIT_GITHUB_API_URL") {
            config
                .catalogs
                .entry("github".to_string())
                .or_default()
                .insert("api_url".to_string(), val);
        }

        if let Ok(val) = env::var("PLUGINKIT_HTTP_TIMEOUT_SECS") {
            config.http.timeout_secs = val.parse().map_err(|_| {
                Error::validation("PLUGINKIT_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        Ok(config)
    }
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, anything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}
