//! Shared utility functions for pluginkit crates

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// test harnesses and containers can redirect it.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or_else(|| Error::validation("Could not determine home directory"))
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(get_home_dir()?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}
