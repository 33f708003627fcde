//! Catalog contract

use crate::content::FetchedPlugin;
use crate::error::{Error, Result};
use crate::types::PluginRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Backend-specific settings passed to [`Catalog::setup`]
pub type CatalogSettings = BTreeMap<String, String>;

/// Free-form search filters; `query` narrows results where supported
pub type SearchCriteria = BTreeMap<String, String>;

/// Criteria key holding a free-text query
pub const CRITERIA_QUERY: &str = "query";

/// A source of plugin releases.
///
/// `setup` is called once, before the catalog is shared. Implementations
/// resolve `""` and `"latest"` to the newest version themselves.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Identifier used for registry lookup and stored in plugin records
    fn id(&self) -> &str;

    /// Configure the catalog, failing on missing required keys
    fn setup(&mut self, settings: &CatalogSettings) -> Result<()>;

    /// Fetch the record and content of `name` at `version`
    async fn fetch(
        &self,
        cancel: &CancellationToken,
        name: &str,
        version: &str,
    ) -> Result<FetchedPlugin>;

    /// List available plugins
    async fn search(
        &self,
        cancel: &CancellationToken,
        criteria: &SearchCriteria,
    ) -> Result<Vec<PluginRecord>>;
}

/// True when `version` asks for the newest release
pub fn is_latest(version: &str) -> bool {
    version.is_empty() || version.eq_ignore_ascii_case("latest")
}

/// Look up a required, non-empty setting
pub fn required_setting<'a>(settings: &'a CatalogSettings, key: &str) -> Result<&'a str> {
    match settings.get(key).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::validation(format!(
            "missing required setting '{}'",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_latest() {
        assert!(is_latest(""));
        assert!(is_latest("latest"));
        assert!(is_latest("LATEST"));
        assert!(!is_latest("1.0.0"));
    }

    #[test]
    fn test_required_setting() {
        let mut settings = CatalogSettings::new();
        settings.insert("topic".into(), "pluginkit-plugin".into());
        settings.insert("prefix".into(), "  ".into());

        assert_eq!(
            required_setting(&settings, "topic").unwrap(),
            "pluginkit-plugin"
        );
        assert!(matches!(
            required_setting(&settings, "prefix"),
            Err(Error::Validation { .. })
        ));
        assert!(required_setting(&settings, "owner").is_err());
    }
}
