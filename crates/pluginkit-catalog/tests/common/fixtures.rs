//! Local catalog trees on disk

use pluginkit_catalog::LocalCatalog;
use pluginkit_core::{Catalog, CatalogSettings, Platform};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `<root>/<name>/<version>/<asset>` with `content`
pub fn publish(root: &Path, name: &str, version: &str, asset: &str, content: &[u8]) {
    let dir = root.join(name).join(version);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(asset), content).unwrap();
}

pub fn describe(root: &Path, name: &str, description: &str) {
    fs::create_dir_all(root.join(name)).unwrap();
    fs::write(root.join(name).join("DESCRIPTION"), description).unwrap();
}

/// Local catalog over a fresh directory, resolving for linux/amd64
pub fn local_catalog() -> (TempDir, LocalCatalog) {
    let temp = TempDir::new().unwrap();
    let catalog = local_catalog_at(temp.path());
    (temp, catalog)
}

pub fn local_catalog_at(root: &Path) -> LocalCatalog {
    let mut settings = CatalogSettings::new();
    settings.insert("path".into(), root.display().to_string());
    let mut catalog = LocalCatalog::new().with_platform(Platform::new("linux", "amd64"));
    catalog.setup(&settings).unwrap();
    catalog
}
