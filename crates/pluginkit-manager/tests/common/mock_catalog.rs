//! In-memory catalog with scripted failures

use async_trait::async_trait;
use pluginkit_core::catalog::is_latest;
use pluginkit_core::{
    CancellationToken, Catalog, CatalogSettings, Error, FetchedPlugin, PluginContent,
    PluginRecord, PluginStatus, Result, SearchCriteria,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone)]
struct Release {
    version: String,
    content: Vec<u8>,
    file_name: String,
}

/// What `fetch` should do instead of answering normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFault {
    Upstream,
    /// Trip the caller's token and return content anyway
    CancelMidFlight,
}

#[derive(Default)]
pub struct MockCatalog {
    releases: Mutex<BTreeMap<String, Vec<Release>>>,
    fault: Mutex<Option<FetchFault>>,
    fetches: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `content` as `name` at `version`; the last publish is latest
    pub fn publish(&self, name: &str, version: &str, content: Vec<u8>) {
        self.publish_as(name, version, content, "");
    }

    pub fn publish_as(&self, name: &str, version: &str, content: Vec<u8>, file_name: &str) {
        self.releases
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(Release {
                version: version.to_string(),
                content,
                file_name: file_name.to_string(),
            });
    }

    pub fn set_fault(&self, fault: Option<FetchFault>) {
        *self.fault.lock().unwrap() = fault;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    fn id(&self) -> &str {
        "mock"
    }

    fn setup(&mut self, _settings: &CatalogSettings) -> Result<()> {
        Ok(())
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
        name: &str,
        version: &str,
    ) -> Result<FetchedPlugin> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let fault = *self.fault.lock().unwrap();
        if fault == Some(FetchFault::Upstream) {
            return Err(Error::upstream("catalog unavailable"));
        }

        let releases = self.releases.lock().unwrap();
        let versions = releases.get(name).ok_or_else(|| Error::not_found(name))?;
        let found = if is_latest(version) {
            versions.last()
        } else {
            versions.iter().find(|r| r.version == version)
        };
        let release = found
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{}@{}", name, version)))?;
        drop(releases);

        if fault == Some(FetchFault::CancelMidFlight) {
            cancel.cancel();
        }

        let mut record = PluginRecord::new(name);
        record.version = release.version;
        record.file_name = release.file_name;
        record.description = format!("{} plugin", name);
        record.store_id = "mock".to_string();
        record.runtime_id = "exec".to_string();
        record.status = Some(PluginStatus::Available);

        Ok(FetchedPlugin {
            record,
            content: PluginContent::from(release.content),
        })
    }

    async fn search(
        &self,
        _cancel: &CancellationToken,
        _criteria: &SearchCriteria,
    ) -> Result<Vec<PluginRecord>> {
        let releases = self.releases.lock().unwrap();
        Ok(releases
            .iter()
            .filter_map(|(name, versions)| {
                let latest = versions.last()?;
                let mut record = PluginRecord::new(name);
                record.version = latest.version.clone();
                record.store_id = "mock".to_string();
                Some(record)
            })
            .collect())
    }
}
