//! Asset resolution over release asset names
//!
//! [`find_asset`] picks the single artifact to download for a platform;
//! [`filter_assets`] lists the artifacts that follow the naming convention
//! at all, for search listings.

use pluginkit_core::platform::{SUPPORTED_ARCH, SUPPORTED_OS};
use pluginkit_core::{Error, Result, RuntimeKind};
use std::collections::HashSet;
use tracing::debug;

/// Detached signature and checksum files are never plugin payloads
const SIGNATURE_SUFFIXES: [&str; 3] = [".sha256", ".asc", ".sig"];

/// Extensions tried for every pattern, in order
const RESOLVE_EXTENSIONS: [&str; 6] = ["", ".exe", ".zip", ".tar.gz", ".tgz", ".wasm"];

const NATIVE_EXTENSIONS: [&str; 2] = ["", ".exe"];
const ARCHIVE_EXTENSIONS: [&str; 3] = [".zip", ".tar.gz", ".tgz"];
const WASM_EXTENSIONS: [&str; 4] = [".wasm", ".wasm.zip", ".wasm.tar.gz", ".wasm.tgz"];

/// A resolved download target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub name: String,
    pub runtime: RuntimeKind,
}

/// Pick the best asset for `name` at `version` on `os`/`arch`.
///
/// Candidates must start with `name` and must not be signature files.
/// Patterns are tried from most to least specific
/// (`{name}-{version}-{os}-{arch}`, `{name}-{version}`, `{name}`), each with
/// every extension in order, each against the candidates in their original
/// order. The first glob match wins.
pub fn find_asset(
    prefix: &str,
    name: &str,
    version: &str,
    os: &str,
    arch: &str,
    assets: &[String],
) -> Result<ResolvedAsset> {
    debug!(
        "Resolving asset for {} {} ({}/{}) among {} assets",
        name,
        version,
        os,
        arch,
        assets.len()
    );

    let candidates: Vec<&str> = assets
        .iter()
        .map(String::as_str)
        .filter(|asset| is_candidate(name, asset))
        .collect();

    if candidates.is_empty() {
        return Err(Error::NoCandidates {
            name: qualified_name(prefix, name),
        });
    }

    let patterns = [
        format!("{}-{}-{}-{}", name, version, os, arch),
        format!("{}-{}", name, version),
        name.to_string(),
    ];

    let options = glob::MatchOptions {
        require_literal_separator: true,
        ..Default::default()
    };

    for pattern in &patterns {
        for ext in RESOLVE_EXTENSIONS {
            let Ok(glob) = glob::Pattern::new(&format!("{}{}", pattern, ext)) else {
                continue;
            };
            if let Some(asset) = candidates
                .iter()
                .find(|asset| glob.matches_with(asset, options)) {
                let runtime = if ext.contains("wasm") {
                    RuntimeKind::Wasm
                } else {
                    RuntimeKind::Exec
                };
                debug!("Resolved asset {} ({})", asset, runtime);
                return Ok(ResolvedAsset {
                    name: asset.to_string(),
                    runtime,
                });
            }
        }
    }

    Err(Error::NoMatch {
        name: name.to_string(),
        version: version.to_string(),
        os: os.to_string(),
        arch: arch.to_string(),
    })
}

/// Assets named `{prefix}-{name}`, `{prefix}-{name}-v{version}` or
/// `{prefix}-{name}-v{version}-{os}-{arch}` with a native, archive or wasm
/// extension, in input order.
pub fn filter_assets(prefix: &str, name: &str, version: &str, assets: &[String]) -> Vec<String> {
    let mut patterns = vec![
        format!("{}-{}", prefix, name),
        format!("{}-{}-v{}", prefix, name, version),
    ];
    for os in SUPPORTED_OS {
        for arch in SUPPORTED_ARCH {
            patterns.push(format!("{}-{}-v{}-{}-{}", prefix, name, version, os, arch));
        }
    }

    let extensions = NATIVE_EXTENSIONS
        .iter()
        .chain(ARCHIVE_EXTENSIONS.iter())
        .chain(WASM_EXTENSIONS.iter());

    let valid: HashSet<String> = extensions
        .flat_map(|ext| patterns.iter().map(move |p| format!("{}{}", p, ext)))
        .collect();

    assets
        .iter()
        .filter(|asset| valid.contains(asset.as_str()))
        .cloned()
        .collect()
}

/// Runtime implied by a listing: wasm if any asset is byte-code
pub fn listing_runtime(assets: &[String]) -> RuntimeKind {
    let is_wasm = assets
        .iter()
        .any(|asset| WASM_EXTENSIONS.iter().any(|ext| asset.ends_with(ext)));
    if is_wasm {
        RuntimeKind::Wasm
    } else {
        RuntimeKind::Exec
    }
}

/// File name a raw (non-archive) asset is installed under.
///
/// Executables land at `{name}` (or `{name}.exe`), byte-code at `{name}.wasm`.
pub fn install_file_name(name: &str, asset: &str) -> String {
    if asset.ends_with(".exe") {
        format!("{}.exe", name)
    } else if asset.ends_with(".wasm") {
        format!("{}.wasm", name)
    } else {
        name.to_string()
    }
}

fn is_candidate(name: &str, asset: &str) -> bool {
    asset.starts_with(name) && !SIGNATURE_SUFFIXES.iter().any(|s| asset.ends_with(s))
}

fn qualified_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}-{}", prefix, name)
    }
}
