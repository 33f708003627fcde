//! Local directory catalog
//!
//! Layout: `<path>/<name>/<version>/<assets>`. Useful for air-gapped hosts
//! and for publishing plugins from a build tree.

use crate::assets::{find_asset, install_file_name, ResolvedAsset};
use async_trait::async_trait;
use pluginkit_core::catalog::{is_latest, required_setting, CRITERIA_QUERY};
use pluginkit_core::types::validate_plugin_name;
use pluginkit_core::{
    CancellationToken, Catalog, CatalogSettings, Error, FetchedPlugin, IoResultExt, Platform,
    PluginContent, PluginRecord, PluginStatus, Result, SearchCriteria,
};
use semver::Version;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Catalog reading plugin releases from a directory tree
pub struct LocalCatalog {
    root: Option<PathBuf>,
    prefix: String,
    platform: Platform,
}

impl LocalCatalog {
    pub const ID: &'static str = "local";

    pub fn new() -> Self {
        Self {
            root: None,
            prefix: String::new(),
            platform: Platform::current(),
        }
    }

    /// Resolve assets for `platform` instead of the host
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    fn root(&self) -> Result<&Path> {
        self.root
            .as_deref()
            .ok_or_else(|| Error::validation("local catalog used before setup"))
    }

    /// Version directory for `version`, resolving `""`/`"latest"` to the newest
    fn version_dir(
        &self,
        plugin_dir: &Path,
        name: &str,
        version: &str,
    ) -> Result<(String, PathBuf)> {
        if !is_latest(version) {
            if version.contains(['/', '\\']) || version == "." || version == ".." {
                return Err(Error::validation(format!("invalid version: {}", version)));
            }
            let dir = plugin_dir.join(version);
            if !dir.is_dir() {
                return Err(Error::not_found(format!("{}@{}", name, version)));
            }
            return Ok((version.to_string(), dir));
        }

        let versions = list_dirs(plugin_dir)?;
        let newest = newest_version(&versions).ok_or_else(|| Error::not_found(name))?;
        Ok((newest.to_string(), plugin_dir.join(newest)))
    }

    fn resolve(&self, name: &str, version: &str, version_dir: &Path) -> Result<ResolvedAsset> {
        let mut assets = list_files(version_dir)?;
        assets.sort();
        find_asset(
            &self.prefix,
            name,
            version,
            &self.platform.os,
            &self.platform.arch,
            &assets,
        )
    }
}

impl Default for LocalCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Catalog for LocalCatalog {
    fn id(&self) -> &str {
        Self::ID
    }

    fn setup(&mut self, settings: &CatalogSettings) -> Result<()> {
        let path = PathBuf::from(required_setting(settings, "path")?);
        self.prefix = settings.get("prefix").cloned().unwrap_or_default();
        debug!("Local catalog configured at {}", path.display());
        self.root = Some(path);
        Ok(())
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
        name: &str,
        version: &str,
    ) -> Result<FetchedPlugin> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        validate_plugin_name(name)?;

        let plugin_dir = self.root()?.join(name);
        if !plugin_dir.is_dir() {
            return Err(Error::not_found(name));
        }

        let (version, version_dir) = self.version_dir(&plugin_dir, name, version)?;
        let resolved = self.resolve(name, &version, &version_dir)?;
        let asset_path = version_dir.join(&resolved.name);
        debug!("Serving {} from {}", name, asset_path.display());

        let file =
            File::open(&asset_path).io_context(format!("opening {}", asset_path.display()))?;

        let mut record = PluginRecord::new(name);
        record.file_name = install_file_name(name, &resolved.name);
        record.version = version;
        record.description = read_description(&plugin_dir);
        record.store_id = Self::ID.to_string();
        record.runtime_id = resolved.runtime.to_string();
        record.status = Some(PluginStatus::Available);
        record.metadata.insert("asset".into(), resolved.name);
        record
            .metadata
            .insert("source".into(), asset_path.display().to_string());

        Ok(FetchedPlugin {
            record,
            content: PluginContent::from_file(file),
        })
    }

    async fn search(
        &self,
        cancel: &CancellationToken,
        criteria: &SearchCriteria,
    ) -> Result<Vec<PluginRecord>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let root = self.root()?;
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let query = criteria
            .get(CRITERIA_QUERY)
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let mut names = list_dirs(root)?;
        names.sort();

        let mut records = Vec::new();
        for name in names {
            if let Some(query) = &query {
                if !name.to_lowercase().contains(query.as_str()) {
                    continue;
                }
            }

            let plugin_dir = root.join(&name);
            let (version, version_dir) = match self.version_dir(&plugin_dir, &name, "latest") {
                Ok(found) => found,
                Err(e) => {
                    debug!("Skipping {}: {}", name, e);
                    continue;
                }
            };
            let resolved = match self.resolve(&name, &version, &version_dir) {
                Ok(resolved) => resolved,
                Err(e) => {
                    debug!("Skipping {}: {}", name, e);
                    continue;
                }
            };

            let mut record = PluginRecord::new(&name);
            record.version = version;
            record.description = read_description(&plugin_dir);
            record.store_id = Self::ID.to_string();
            record.runtime_id = resolved.runtime.to_string();
            record.status = Some(PluginStatus::Available);
            records.push(record);
        }

        Ok(records)
    }
}

/// Optional one-line `DESCRIPTION` file next to the version directories
fn read_description(plugin_dir: &Path) -> String {
    fs::read_to_string(plugin_dir.join("DESCRIPTION"))
        .map(|d| d.trim().to_string())
        .unwrap_or_default()
}

fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    list_entries(dir, true)
}

fn list_files(dir: &Path) -> Result<Vec<String>> {
    list_entries(dir, false)
}

fn list_entries(dir: &Path, dirs: bool) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).io_context(format!("reading {}", dir.display()))? {
        let entry = entry.io_context(format!("reading {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .io_context(format!("reading {}", entry.path().display()))?;
        if file_type.is_dir() == dirs {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Highest semantic version; a leading `v` is ignored. Falls back to the
/// lexically greatest name when nothing parses.
fn newest_version(versions: &[String]) -> Option<&str> {
    let parsed = versions
        .iter()
        .filter_map(|v| Version::parse(v.trim_start_matches('v')).ok().map(|p| (p, v)))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, v)| v.as_str());

    parsed.or_else(|| versions.iter().max().map(String::as_str))
}
