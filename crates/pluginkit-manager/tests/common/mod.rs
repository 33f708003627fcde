//! Common test utilities for pluginkit-manager

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_catalog;

pub use mock_catalog::*;

use flate2::write::GzEncoder;
use flate2::Compression;
use pluginkit_manager::LifecycleManager;
use std::sync::Arc;
use tempfile::TempDir;

/// gzip-compressed tar holding `entries` as `(path, data, mode)`
pub fn tar_gz(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data, mode) in entries {
        let mut header = tar::Header::new_gnu();
        let name = path.as_bytes();
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append(&header, *data).unwrap();
    }
    let tar = builder.into_inner().unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    std::io::Write::write_all(&mut encoder, &tar).unwrap();
    encoder.finish().unwrap()
}

/// Manager over a fresh root backed by `catalog`
pub fn manager_with(catalog: Arc<MockCatalog>) -> (TempDir, LifecycleManager) {
    let temp = TempDir::new().unwrap();
    let manager = LifecycleManager::new(temp.path().join("plugins"), catalog);
    (temp, manager)
}
