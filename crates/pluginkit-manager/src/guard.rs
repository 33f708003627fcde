//! Scoped plugin directory creation

use pluginkit_core::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A freshly created plugin directory that is removed again on drop unless
/// [`commit`](Self::commit) is called.
#[derive(Debug)]
pub(crate) struct PluginDirGuard {
    path: PathBuf,
    cleanup: bool,
}

impl PluginDirGuard {
    /// Create `path`, which must not exist yet.
    ///
    /// An existing directory is reported as `AlreadyInstalled` for `name`.
    pub(crate) fn create(path: &Path, name: &str) -> Result<Self> {
        match fs::create_dir(path) {
            Ok(()) => Ok(Self {
                path: path.to_path_buf(),
                cleanup: true,
            }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::already_installed(name)),
            Err(e) => Err(Error::io(format!("creating {}", path.display()), e)),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the directory
    pub(crate) fn commit(mut self) {
        self.cleanup = false;
    }
}

impl Drop for PluginDirGuard {
    fn drop(&mut self) {
        if !self.cleanup {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            tracing::warn!(
                "Failed to clean up plugin directory {}: {}",
                self.path.display(),
                e
            );
        } else {
            tracing::debug!("Removed incomplete plugin directory {}", self.path.display());
        }
    }
}
