//! Plugin record types and the on-disk record file

use crate::error::{Error, IoResultExt, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Name of the record file inside each plugin directory
pub const RECORD_FILE_NAME: &str = "metadata.json";

/// Sibling suffix used while staging an upgrade
pub const STAGING_SUFFIX: &str = ".upgrade";

/// Sibling suffix holding the previous install during the upgrade swap
pub const BACKUP_SUFFIX: &str = ".backup";

/// Metadata key stamped with the RFC 3339 install time
pub const META_INSTALLED: &str = "installed";
pub const META_INSTALLED_VERSION: &str = "installed_version";
pub const META_UPGRADED_FROM: &str = "upgraded_from";
pub const META_PREVIOUS_INSTALL: &str = "previous_install";

/// Plugin lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    Available,
    Installed,
    Enabled,
    Disabled,
}

impl PluginStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Installed => "installed",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an installed plugin is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// Native executable
    Exec,
    /// WebAssembly byte-code
    Wasm,
}

impl RuntimeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exec => "exec",
            Self::Wasm => "wasm",
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exec" => Ok(Self::Exec),
            "wasm" => Ok(Self::Wasm),
            other => Err(Error::validation(format!("unknown runtime: {}", other))),
        }
    }
}

/// Persisted description of a plugin, also used for catalog listings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluginRecord {
    pub name: String,

    #[serde(rename = "filename", default)]
    pub file_name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "store", default)]
    pub store_id: String,

    #[serde(rename = "runtime", default)]
    pub runtime_id: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PluginStatus>,
}

impl PluginRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status == Some(PluginStatus::Enabled)
    }

    /// Install timestamp, if stamped and parseable
    pub fn installed_at(&self) -> Option<DateTime<Utc>> {
        self.metadata
            .get(META_INSTALLED)
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Parsed runtime, when the record carries a known one
    pub fn runtime(&self) -> Option<RuntimeKind> {
        self.runtime_id.parse().ok()
    }
}

/// Read the record stored in `plugin_dir`.
///
/// Returns `Ok(None)` when the directory has no record file. A record that
/// exists but cannot be parsed is an error.
pub fn read_record(plugin_dir: &Path) -> Result<Option<PluginRecord>> {
    let path = plugin_dir.join(RECORD_FILE_NAME);
    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(format!("reading {}", path.display()), e)),
    };
    let record = serde_json::from_slice(&content)?;
    Ok(Some(record))
}

/// Write `record` as pretty-printed JSON into `plugin_dir`
pub fn write_record(plugin_dir: &Path, record: &PluginRecord) -> Result<()> {
    let path = plugin_dir.join(RECORD_FILE_NAME);
    let content = serde_json::to_vec_pretty(record)?;
    fs::write(&path, content).io_context(format!("writing {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644))
            .io_context(format!("setting permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Validate a plugin name before it is used as a directory name
pub fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("plugin name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(Error::validation(format!("invalid plugin name: {}", name)));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(Error::validation(format!(
            "plugin name must not contain path separators: {}",
            name
        )));
    }
    if name.ends_with(STAGING_SUFFIX) || name.ends_with(BACKUP_SUFFIX) {
        return Err(Error::validation(format!(
            "plugin name uses a reserved suffix: {}",
            name
        )));
    }
    Ok(())
}
