//! In-memory archive builders

use std::io::{Cursor, Write};

/// One archive member
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub path: &'static str,
    pub data: &'static [u8],
    pub mode: u32,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink(&'static str),
}

impl Entry {
    pub const fn file(path: &'static str, data: &'static [u8]) -> Self {
        Self {
            path,
            data,
            mode: 0o644,
            kind: EntryKind::File,
        }
    }

    pub const fn executable(path: &'static str, data: &'static [u8]) -> Self {
        Self {
            path,
            data,
            mode: 0o755,
            kind: EntryKind::File,
        }
    }

    pub const fn dir(path: &'static str) -> Self {
        Self {
            path,
            data: b"",
            mode: 0o755,
            kind: EntryKind::Dir,
        }
    }

    pub const fn symlink(path: &'static str, target: &'static str) -> Self {
        Self {
            path,
            data: b"",
            mode: 0o777,
            kind: EntryKind::Symlink(target),
        }
    }
}

/// Binary payload that exercises every byte value
pub fn binary_payload() -> Vec<u8> {
    (0..64 * 1024u32)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
        .collect()
}

/// Build a ustar archive. Names are written raw so hostile paths survive.
pub fn tar_bytes(entries: &[Entry]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for entry in entries {
        append_raw(&mut builder, entry.path, entry.data, entry.mode, entry.kind);
    }
    builder.into_inner().unwrap()
}

/// Build a ustar archive holding a single owned payload
pub fn tar_with_payload(path: &str, data: &[u8], mode: u32) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    append_raw(&mut builder, path, data, mode, EntryKind::File);
    builder.into_inner().unwrap()
}

fn append_raw(
    builder: &mut tar::Builder<Vec<u8>>,
    path: &str,
    data: &[u8],
    mode: u32,
    kind: EntryKind,
) {
    let mut header = tar::Header::new_ustar();
    let name = path.as_bytes();
    header.as_old_mut().name[..name.len()].copy_from_slice(name);
    header.set_mode(mode);
    match kind {
        EntryKind::File => {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(data.len() as u64);
        }
        EntryKind::Dir => {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
        }
        EntryKind::Symlink(target) => {
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_size(0);
            header.set_link_name(target).unwrap();
        }
    }
    header.set_cksum();
    let body: &[u8] = if kind == EntryKind::File { data } else { b"" };
    builder.append(&header, body).unwrap();
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn xz(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn lz4(data: &[u8]) -> Vec<u8> {
    let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn zstd(data: &[u8]) -> Vec<u8> {
    zstd::stream::encode_all(data, 0).unwrap()
}

/// Brotli stream preceded by the framing signature used for sniffing
pub fn brotli_framed(data: &[u8]) -> Vec<u8> {
    let mut out = vec![0xce, 0xb2, 0xcf, 0x81];
    {
        let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
        writer.write_all(data).unwrap();
    }
    out
}

pub fn zip_bytes(entries: &[Entry]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for entry in entries {
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(entry.mode);
        match entry.kind {
            EntryKind::File => {
                writer.start_file(entry.path, options).unwrap();
                writer.write_all(entry.data).unwrap();
            }
            EntryKind::Dir => {
                writer.add_directory(entry.path, options).unwrap();
            }
            EntryKind::Symlink(target) => {
                writer.add_symlink(entry.path, target, options).unwrap();
            }
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Zip holding a single owned payload
pub fn zip_with_payload(path: &str, data: &[u8], mode: u32) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(mode);
    writer.start_file(path, options).unwrap();
    writer.write_all(data).unwrap();
    writer.finish().unwrap().into_inner()
}
