//! Common test utilities for pluginkit-runtime

#![allow(dead_code)]
#![allow(unused_imports)]

use pluginkit_core::types::write_record;
use pluginkit_core::{PluginRecord, PluginStatus};
use std::fs;
use std::path::Path;

/// Install a shell-script plugin under `root` the way the manager would
pub fn install_script(root: &Path, name: &str, script: &str, status: PluginStatus) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, script).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let mut record = PluginRecord::new(name);
    record.file_name = name.to_string();
    record.version = "1.0.0".to_string();
    record.runtime_id = "exec".to_string();
    record.status = Some(status);
    write_record(&dir, &record).unwrap();
}
