//! Path containment for archive entries

use pluginkit_core::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Resolve an archive entry name beneath `dest`.
///
/// The entry is normalized lexically: `.` is dropped and `..` pops the
/// previous component. Absolute names, drive prefixes and any `..` that
/// would climb above `dest` fail with `PathTraversal`. An entry that
/// normalizes to nothing resolves to `dest` itself.
pub fn contained_path(dest: &Path, entry: &Path) -> Result<PathBuf> {
    let mut parts = Vec::new();

    for component in entry.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(Error::path_traversal(entry.display().to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::path_traversal(entry.display().to_string()));
            }
        }
    }

    let mut resolved = dest.to_path_buf();
    resolved.extend(parts);
    Ok(resolved)
}
