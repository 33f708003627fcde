//! Directory rename seam used by the upgrade swap

use std::fs;
use std::io;
use std::path::Path;

/// Moves a directory from one path to another on the same filesystem
pub trait DirRenamer: Send + Sync {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// [`DirRenamer`] backed by [`std::fs::rename`]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdRenamer;

impl DirRenamer for StdRenamer {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}
