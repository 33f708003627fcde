//! End-to-end tests for the extraction pipeline

mod common;

use bytes::Bytes;
use common::*;
use pluginkit_core::{CancellationToken, Error, PluginContent};
use pluginkit_extract::{ArchiveFormat, ExtractionPipeline};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn extract(
    content: PluginContent,
    dest: &Path,
) -> pluginkit_core::Result<pluginkit_extract::ExtractOutcome> {
    ExtractionPipeline::new().extract(&CancellationToken::new(), content, dest, "tool")
}

/// Destination nested one level down so escapes land somewhere observable
fn sandbox() -> (TempDir, std::path::PathBuf) {
    let root = TempDir::new().unwrap();
    let dest = root.path().join("dest");
    fs::create_dir_all(&dest).unwrap();
    (root, dest)
}

fn files_outside(root: &Path, dest: &Path) -> Vec<std::path::PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| !p.starts_with(dest))
        .collect()
}

#[test]
fn test_gzip_tar_round_trip() {
    let payload = binary_payload();
    let archive = gzip(&tar_with_payload("tool", &payload, 0o755));
    let (_root, dest) = sandbox();

    let outcome = extract(PluginContent::from(archive), &dest).unwrap();

    assert_eq!(outcome.format, Some(ArchiveFormat::Gzip));
    assert_eq!(outcome.files, vec![dest.join("tool")]);
    assert_eq!(fs::read(dest.join("tool")).unwrap(), payload);
}

#[test]
fn test_zip_round_trip() {
    let payload = binary_payload();
    let archive = zip_with_payload("tool", &payload, 0o755);
    let (_root, dest) = sandbox();

    let outcome = extract(PluginContent::from(archive), &dest).unwrap();

    assert_eq!(outcome.format, Some(ArchiveFormat::Zip));
    assert_eq!(fs::read(dest.join("tool")).unwrap(), payload);
}

#[test]
fn test_xz_tar_round_trip() {
    let payload = binary_payload();
    let archive = xz(&tar_with_payload("tool", &payload, 0o755));
    let (_root, dest) = sandbox();

    let outcome = extract(PluginContent::from(archive), &dest).unwrap();

    assert_eq!(outcome.format, Some(ArchiveFormat::Xz));
    assert_eq!(fs::read(dest.join("tool")).unwrap(), payload);
}

#[test]
fn test_remaining_compressors() {
    let tar = tar_bytes(&[Entry::executable("tool", b"compressed plugin body")]);
    let cases = [
        (ArchiveFormat::Bzip2, bzip2(&tar)),
        (ArchiveFormat::Lz4, lz4(&tar)),
        (ArchiveFormat::Zstd, zstd(&tar)),
        (ArchiveFormat::Brotli, brotli_framed(&tar)),
        (ArchiveFormat::Tar, tar.clone()),
    ];

    for (format, archive) in cases {
        let (_root, dest) = sandbox();
        let outcome = extract(PluginContent::from(archive), &dest).unwrap();
        assert_eq!(outcome.format, Some(format));
        assert_eq!(
            fs::read(dest.join("tool")).unwrap(),
            b"compressed plugin body",
            "{} payload differs",
            format
        );
    }
}

#[test]
fn test_live_stream_content() {
    let payload = binary_payload();
    let archive = gzip(&tar_with_payload("tool", &payload, 0o755));
    let (_root, dest) = sandbox();

    extract(PluginContent::from_reader(Cursor::new(archive)), &dest).unwrap();

    assert_eq!(fs::read(dest.join("tool")).unwrap(), payload);
}

#[test]
fn test_zip_from_live_stream_is_spooled() {
    let archive = zip_bytes(&[Entry::executable("bin/tool", b"zip body")]);
    let (_root, dest) = sandbox();

    extract(PluginContent::from_reader(Cursor::new(archive)), &dest).unwrap();

    assert_eq!(fs::read(dest.join("bin/tool")).unwrap(), b"zip body");
}

#[test]
fn test_seekable_file_content() {
    let archive = zip_bytes(&[Entry::file("README.md", b"docs")]);
    let (root, dest) = sandbox();
    let path = root.path().join("plugin.zip");
    fs::File::create(&path).unwrap().write_all(&archive).unwrap();

    let file = fs::File::open(&path).unwrap();
    extract(PluginContent::from_file(file), &dest).unwrap();

    assert_eq!(fs::read(dest.join("README.md")).unwrap(), b"docs");
}

#[test]
fn test_nested_tree_and_modes() {
    let tar = tar_bytes(&[
        Entry::dir("bin/"),
        Entry::executable("bin/tool", b"exe"),
        Entry::file("share/doc/README", b"readme"),
    ]);
    let (_root, dest) = sandbox();

    let outcome = extract(PluginContent::from(gzip(&tar)), &dest).unwrap();

    assert_eq!(outcome.files.len(), 2);
    assert!(dest.join("bin").is_dir());
    assert_eq!(fs::read(dest.join("share/doc/README")).unwrap(), b"readme");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = |p: &str| fs::metadata(dest.join(p)).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode("bin/tool"), 0o755);
        assert_eq!(mode("share/doc/README"), 0o644);
    }
}

#[test]
fn test_zip_directories_and_modes() {
    let archive = zip_bytes(&[
        Entry::dir("lib/"),
        Entry::executable("lib/tool", b"exe"),
        Entry::file("lib/data.json", b"{}"),
    ]);
    let (_root, dest) = sandbox();

    extract(PluginContent::from(archive), &dest).unwrap();

    assert!(dest.join("lib").is_dir());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = |p: &str| fs::metadata(dest.join(p)).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode("lib/tool"), 0o755);
        assert_eq!(mode("lib/data.json"), 0o644);
    }
}

#[test]
fn test_tar_path_traversal_rejected() {
    let tar = tar_bytes(&[
        Entry::file("ok.txt", b"fine"),
        Entry::file("../../etc/passwd", b"root::0:0::/:/bin/sh"),
    ]);
    let (root, dest) = sandbox();

    let result = extract(PluginContent::from(gzip(&tar)), &dest);

    assert!(matches!(
        result,
        Err(Error::PathTraversal { entry }) if entry == "../../etc/passwd"
    ));
    assert!(files_outside(root.path(), &dest).is_empty());
}

#[test]
fn test_zip_path_traversal_rejected() {
    let archive = zip_bytes(&[Entry::file("../../etc/passwd", b"root::0:0::/:/bin/sh")]);
    let (root, dest) = sandbox();

    let result = extract(PluginContent::from(archive), &dest);

    assert!(matches!(result, Err(Error::PathTraversal { .. })));
    assert!(files_outside(root.path(), &dest).is_empty());
}

#[test]
fn test_absolute_entry_rejected() {
    let tar = tar_bytes(&[Entry::file("/tmp/pluginkit-absolute", b"x")]);
    let (_root, dest) = sandbox();

    let result = extract(PluginContent::from(tar), &dest);

    assert!(matches!(result, Err(Error::PathTraversal { .. })));
    assert!(!Path::new("/tmp/pluginkit-absolute").exists());
}

#[test]
fn test_symlinks_are_skipped() {
    let tar = tar_bytes(&[
        Entry::symlink("link", "tool"),
        Entry::executable("tool", b"exe"),
    ]);
    let (_root, dest) = sandbox();

    let outcome = extract(PluginContent::from(gzip(&tar)), &dest).unwrap();

    assert_eq!(outcome.files, vec![dest.join("tool")]);
    assert!(fs::symlink_metadata(dest.join("link")).is_err());
}

#[test]
fn test_zip_symlinks_are_skipped() {
    let archive = zip_bytes(&[
        Entry::symlink("link", "tool"),
        Entry::executable("tool", b"exe"),
    ]);
    let (_root, dest) = sandbox();

    let outcome = extract(PluginContent::from(archive), &dest).unwrap();

    assert_eq!(outcome.files, vec![dest.join("tool")]);
    assert!(fs::symlink_metadata(dest.join("link")).is_err());
}

#[test]
fn test_forced_format_skips_sniffing() {
    let tar = tar_bytes(&[Entry::executable("tool", b"forced")]);
    let (_root, dest) = sandbox();

    let outcome = ExtractionPipeline::new()
        .extract_as(
            &CancellationToken::new(),
            PluginContent::from(gzip(&tar)),
            &dest,
            "tool",
            Some(ArchiveFormat::Gzip),
        )
        .unwrap();

    assert_eq!(outcome.format, Some(ArchiveFormat::Gzip));
    assert_eq!(fs::read(dest.join("tool")).unwrap(), b"forced");
}

#[test]
fn test_truncated_gzip_header_fails() {
    let truncated = Bytes::from_static(&[0x1f, 0x8b, 0x08, 0x00]);
    let (_root, dest) = sandbox();

    let result = extract(PluginContent::Bytes(truncated), &dest);

    assert!(matches!(
        result,
        Err(Error::Archive { .. }) | Err(Error::Io { .. })
    ));
    assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
}

#[test]
fn test_cancelled_token_writes_nothing() {
    let archive = gzip(&tar_bytes(&[Entry::executable("tool", b"exe")]));
    let (_root, dest) = sandbox();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result =
        ExtractionPipeline::new().extract(&cancel, PluginContent::from(archive), &dest, "tool");

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
}
