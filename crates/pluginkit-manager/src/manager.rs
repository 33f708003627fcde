//! Plugin lifecycle manager
//!
//! Owns `<root>/<name>/` for every installed plugin. Mutations (install,
//! uninstall, enable, disable, upgrade) hold an exclusive lock; `list`,
//! `search` and `get` share a read lock. Nothing here guards against a second
//! process working on the same root.

use crate::guard::PluginDirGuard;
use crate::rename::{DirRenamer, StdRenamer};
use chrono::Utc;
use pluginkit_core::catalog::is_latest;
use pluginkit_core::types::{
    read_record, validate_plugin_name, write_record, BACKUP_SUFFIX, META_INSTALLED,
    META_INSTALLED_VERSION, META_PREVIOUS_INSTALL, META_UPGRADED_FROM, RECORD_FILE_NAME,
    STAGING_SUFFIX,
};
use pluginkit_core::{
    CancellationToken, Catalog, Error, IoResultExt, PluginRecord, PluginStatus, Result,
    SearchCriteria,
};
use pluginkit_extract::ExtractionPipeline;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Installs, upgrades and tracks plugins under a single root directory
pub struct LifecycleManager {
    root: PathBuf,
    catalog: Arc<dyn Catalog>,
    pipeline: ExtractionPipeline,
    renamer: Arc<dyn DirRenamer>,
    lock: RwLock<()>,
}

impl LifecycleManager {
    pub fn new(root: impl Into<PathBuf>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            root: root.into(),
            catalog,
            pipeline: ExtractionPipeline::new(),
            renamer: Arc::new(StdRenamer),
            lock: RwLock::new(()),
        }
    }

    pub fn with_pipeline(mut self, pipeline: ExtractionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Replace the directory renamer used by [`upgrade`](Self::upgrade)
    pub fn with_renamer(mut self, renamer: Arc<dyn DirRenamer>) -> Self {
        self.renamer = renamer;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    /// Directory a plugin is (or would be) installed in
    pub fn plugin_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Fetch `name` at `version` from the catalog and install it enabled.
    ///
    /// Either the plugin directory ends up complete with its record, or it
    /// does not exist at all.
    pub async fn install(
        &self,
        cancel: &CancellationToken,
        name: &str,
        version: &str,
    ) -> Result<PluginRecord> {
        validate_plugin_name(name)?;
        let _lock = self.lock.write().await;
        check_cancelled(cancel)?;

        let dir = self.plugin_path(name);
        if dir.exists() {
            return Err(Error::already_installed(name));
        }

        info!("Installing {} ({})", name, display_version(version));
        fs::create_dir_all(&self.root)
            .io_context(format!("creating plugin root {}", self.root.display()))?;
        let staged = PluginDirGuard::create(&dir, name)?;

        let record = self.stage(cancel, name, version, staged.path()).await?;
        check_cancelled(cancel)?;
        write_record(staged.path(), &record)?;
        staged.commit();

        info!("Installed {} {}", name, record.version);
        Ok(record)
    }

    /// Remove an installed plugin and everything in its directory
    pub async fn uninstall(&self, cancel: &CancellationToken, name: &str) -> Result<()> {
        validate_plugin_name(name)?;
        let _lock = self.lock.write().await;
        check_cancelled(cancel)?;

        let dir = self.plugin_path(name);
        if !dir.is_dir() {
            return Err(Error::not_installed(name));
        }

        fs::remove_dir_all(&dir).io_context(format!("removing {}", dir.display()))?;
        info!("Uninstalled {}", name);
        Ok(())
    }

    pub async fn enable(&self, cancel: &CancellationToken, name: &str) -> Result<PluginRecord> {
        self.set_status(cancel, name, PluginStatus::Enabled).await
    }

    pub async fn disable(&self, cancel: &CancellationToken, name: &str) -> Result<PluginRecord> {
        self.set_status(cancel, name, PluginStatus::Disabled).await
    }

    async fn set_status(
        &self,
        cancel: &CancellationToken,
        name: &str,
        status: PluginStatus,
    ) -> Result<PluginRecord> {
        validate_plugin_name(name)?;
        let _lock = self.lock.write().await;
        check_cancelled(cancel)?;

        let dir = self.plugin_path(name);
        let mut record = match read_record(&dir) {
            Ok(Some(record)) => record,
            Ok(None) => return Err(Error::not_installed(name)),
            Err(e) => {
                debug!("Unreadable record for {}: {}", name, e);
                return Err(Error::not_installed(name));
            }
        };

        record.status = Some(status);
        write_record(&dir, &record)?;
        info!("{} is now {}", name, status);
        Ok(record)
    }

    /// Installed record of `name`
    pub async fn get(&self, name: &str) -> Result<PluginRecord> {
        validate_plugin_name(name)?;
        let _lock = self.lock.read().await;
        read_record(&self.plugin_path(name))?.ok_or_else(|| Error::not_installed(name))
    }

    /// Every installed plugin, sorted by name.
    ///
    /// Directories without a record are skipped; a malformed record fails the
    /// whole listing. A missing root lists nothing.
    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<PluginRecord>> {
        let _lock = self.lock.read().await;
        check_cancelled(cancel)?;
        self.list_unlocked()
    }

    fn list_unlocked(&self) -> Result<Vec<PluginRecord>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let entries =
            fs::read_dir(&self.root).io_context(format!("reading {}", self.root.display()))?;
        for entry in entries {
            let entry = entry.io_context(format!("reading {}", self.root.display()))?;
            let path = entry.path();
            if !path.is_dir() || is_swap_sibling(&path) {
                continue;
            }
            match read_record(&path)? {
                Some(record) => records.push(record),
                None => debug!("Skipping {}: no plugin record", path.display()),
            }
        }

        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    /// Catalog search results, each marked installed (with the local
    /// version) or available
    pub async fn search(
        &self,
        cancel: &CancellationToken,
        criteria: &SearchCriteria,
    ) -> Result<Vec<PluginRecord>> {
        let _lock = self.lock.read().await;
        check_cancelled(cancel)?;

        let mut results = self.catalog.search(cancel, criteria).await?;
        let installed: HashMap<String, PluginRecord> = self
            .list_unlocked()?
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();

        for result in &mut results {
            match installed.get(&result.name) {
                Some(local) => {
                    result.status = Some(PluginStatus::Installed);
                    result
                        .metadata
                        .insert(META_INSTALLED_VERSION.to_string(), local.version.clone());
                }
                None => result.status = Some(PluginStatus::Available),
            }
        }

        debug!("Search returned {} plugins", results.len());
        Ok(results)
    }

    /// Replace an installed plugin with `version`.
    ///
    /// The new version is staged next to the live directory, then swapped in
    /// with two renames. If the second rename fails the previous install is
    /// moved back.
    pub async fn upgrade(
        &self,
        cancel: &CancellationToken,
        name: &str,
        version: &str,
    ) -> Result<PluginRecord> {
        validate_plugin_name(name)?;
        let _lock = self.lock.write().await;
        check_cancelled(cancel)?;

        let dir = self.plugin_path(name);
        let staging = sibling(&dir, STAGING_SUFFIX);
        let backup = sibling(&dir, BACKUP_SUFFIX);

        self.recover_interrupted_swap(name, &dir, &backup)?;

        let current = read_record(&dir)?.ok_or_else(|| Error::not_installed(name))?;
        if !is_latest(version) && current.version == version {
            return Err(Error::already_at_version(name, version));
        }

        remove_stale(&staging)?;
        remove_stale(&backup)?;

        info!(
            "Upgrading {} from {} to {}",
            name,
            current.version,
            display_version(version)
        );
        let staged = PluginDirGuard::create(&staging, name)?;
        let mut record = self.stage(cancel, name, version, staged.path()).await?;

        if record.version == current.version {
            return Err(Error::already_at_version(name, record.version));
        }

        record.status = current.status.or(Some(PluginStatus::Enabled));
        record
            .metadata
            .insert(META_UPGRADED_FROM.to_string(), current.version.clone());
        if let Some(previous) = current.metadata.get(META_INSTALLED) {
            record
                .metadata
                .insert(META_PREVIOUS_INSTALL.to_string(), previous.clone());
        }

        check_cancelled(cancel)?;
        write_record(staged.path(), &record)?;

        check_cancelled(cancel)?;
        self.renamer
            .rename(&dir, &backup)
            .io_context(format!("moving {} aside", dir.display()))?;

        if let Err(e) = self.renamer.rename(staged.path(), &dir) {
            warn!("Swap failed for {}, restoring previous install", name);
            if let Err(restore) = self.renamer.rename(&backup, &dir) {
                error!(
                    "Failed to restore {} from {}: {}",
                    dir.display(),
                    backup.display(),
                    restore
                );
            }
            return Err(Error::io(format!("moving upgraded {} into place", name), e));
        }
        staged.commit();

        if let Err(e) = fs::remove_dir_all(&backup) {
            warn!("Failed to remove backup {}: {}", backup.display(), e);
        }

        info!("Upgraded {} to {}", name, record.version);
        Ok(record)
    }

    /// Put a backup left by a crash between the two swap renames back in place
    fn recover_interrupted_swap(&self, name: &str, dir: &Path, backup: &Path) -> Result<()> {
        if dir.exists() || !backup.join(RECORD_FILE_NAME).is_file() {
            return Ok(());
        }
        warn!("Restoring {} from an interrupted upgrade", name);
        self.renamer
            .rename(backup, dir)
            .io_context(format!("restoring {}", backup.display()))
    }

    /// Fetch and extract into `dir`, returning the record to persist
    async fn stage(
        &self,
        cancel: &CancellationToken,
        name: &str,
        version: &str,
        dir: &Path,
    ) -> Result<PluginRecord> {
        info!("Stage 1/2: fetching {}", name);
        let fetched = self.catalog.fetch(cancel, name, version).await?;
        check_cancelled(cancel)?;

        let mut record = fetched.record;
        let file_name = if record.file_name.is_empty() {
            name.to_string()
        } else {
            record.file_name.clone()
        };

        info!("Stage 2/2: extracting {} ({})", name, fetched.content.kind());
        let pipeline = self.pipeline.clone();
        let token = cancel.clone();
        let content = fetched.content;
        let dest = dir.to_path_buf();
        let target = file_name.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            pipeline.extract(&token, content, &dest, &target)
        })
        .await
        .map_err(|e| Error::io("extraction task failed", std::io::Error::other(e)))??;
        debug!(
            "Extracted {} files for {} (format: {})",
            outcome.files.len(),
            name,
            outcome.format.map(|f| f.as_str()).unwrap_or("raw")
        );

        record.name = name.to_string();
        record.file_name = file_name;
        if !is_latest(version) {
            record.version = version.to_string();
        }
        record.status = Some(PluginStatus::Enabled);
        record
            .metadata
            .insert(META_INSTALLED.to_string(), Utc::now().to_rfc3339());
        Ok(record)
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("root", &self.root)
            .field("catalog", &self.catalog.id())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

fn display_version(version: &str) -> &str {
    if is_latest(version) {
        "latest"
    } else {
        version
    }
}

fn sibling(dir: &Path, suffix: &str) -> PathBuf {
    let mut name = dir.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn is_swap_sibling(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(STAGING_SUFFIX) || n.ends_with(BACKUP_SUFFIX))
}

fn remove_stale(path: &Path) -> Result<()> {
    if path.exists() {
        warn!("Removing stale {}", path.display());
        fs::remove_dir_all(path).io_context(format!("removing {}", path.display()))?;
    }
    Ok(())
}
