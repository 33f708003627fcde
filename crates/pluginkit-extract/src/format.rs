//! Archive format detection and the fixed stage table

use pluginkit_core::Error;
use std::fmt;
use std::str::FromStr;

/// Number of leading bytes inspected when sniffing
pub const SNIFF_LEN: usize = 512;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZIP_MAGICS: [&[u8]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];
const XZ_MAGIC: &[u8] = &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
const BZIP2_MAGIC: &[u8] = b"BZh";
const LZ4_MAGIC: &[u8] = &[0x04, 0x22, 0x4d, 0x18];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC: &[u8] = b"ustar";

/// Framing signature preceding a raw brotli stream
pub const BROTLI_MAGIC: &[u8] = &[0xce, 0xb2, 0xcf, 0x81];

/// Every payload format the pipeline knows how to unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Gzip,
    Zip,
    Xz,
    Bzip2,
    Lz4,
    Brotli,
    Zstd,
    Tar,
}

/// One step of an extraction chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Gunzip,
    Unxz,
    Bunzip2,
    Unlz4,
    Unbrotli,
    Unzstd,
    Untar,
    Unzip,
}

impl Stage {
    /// Terminal stages write entries themselves and end the chain
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Untar | Self::Unzip)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gunzip => "gunzip",
            Self::Unxz => "unxz",
            Self::Bunzip2 => "bunzip2",
            Self::Unlz4 => "unlz4",
            Self::Unbrotli => "unbrotli",
            Self::Unzstd => "unzstd",
            Self::Untar => "untar",
            Self::Unzip => "unzip",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ArchiveFormat {
    pub const ALL: [ArchiveFormat; 8] = [
        Self::Gzip,
        Self::Zip,
        Self::Xz,
        Self::Bzip2,
        Self::Lz4,
        Self::Brotli,
        Self::Zstd,
        Self::Tar,
    ];

    /// Detect the format from the leading bytes of a payload
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.starts_with(GZIP_MAGIC) {
            return Some(Self::Gzip);
        }
        if ZIP_MAGICS.iter().any(|magic| header.starts_with(magic)) {
            return Some(Self::Zip);
        }
        if header.starts_with(XZ_MAGIC) {
            return Some(Self::Xz);
        }
        if header.starts_with(BZIP2_MAGIC) {
            return Some(Self::Bzip2);
        }
        if header.starts_with(LZ4_MAGIC) {
            return Some(Self::Lz4);
        }
        if header.starts_with(ZSTD_MAGIC) {
            return Some(Self::Zstd);
        }
        if header.starts_with(BROTLI_MAGIC) {
            return Some(Self::Brotli);
        }
        if header
            .get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len())
            .is_some_and(|magic| magic == TAR_MAGIC)
        {
            return Some(Self::Tar);
        }
        None
    }

    /// Ordered stage chain for this format
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            Self::Gzip => &[Stage::Gunzip, Stage::Untar],
            Self::Zip => &[Stage::Unzip],
            Self::Xz => &[Stage::Unxz, Stage::Untar],
            Self::Bzip2 => &[Stage::Bunzip2, Stage::Untar],
            Self::Lz4 => &[Stage::Unlz4, Stage::Untar],
            Self::Brotli => &[Stage::Unbrotli, Stage::Untar],
            Self::Zstd => &[Stage::Unzstd, Stage::Untar],
            Self::Tar => &[Stage::Untar],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zip => "zip",
            Self::Xz => "xz",
            Self::Bzip2 => "bzip2",
            Self::Lz4 => "lz4",
            Self::Brotli => "brotli",
            Self::Zstd => "zstd",
            Self::Tar => "tar",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Gzip => "application/gzip",
            Self::Zip => "application/zip",
            Self::Xz => "application/x-xz",
            Self::Bzip2 => "application/x-bzip2",
            Self::Lz4 => "application/x-lz4",
            Self::Brotli => "application/x-brotli",
            Self::Zstd => "application/zstd",
            Self::Tar => "application/x-tar",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    /// Parse a format tag, file extension or MIME type
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        let format = match tag.trim_start_matches('.') {
            "gzip" | "gz" | "tgz" | "tar.gz" | "application/gzip" | "application/x-gzip" => {
                Self::Gzip
            }
            "zip" | "application/zip" => Self::Zip,
            "xz" | "txz" | "tar.xz" | "application/x-xz" => Self::Xz,
            "bzip2" | "bz2" | "tbz2" | "tar.bz2" | "application/x-bzip2" => Self::Bzip2,
            "lz4" | "tar.lz4" | "application/x-lz4" => Self::Lz4,
            "brotli" | "br" | "tar.br" | "application/x-brotli" => Self::Brotli,
            "zstd" | "zst" | "tar.zst" | "application/zstd" => Self::Zstd,
            "tar" | "application/x-tar" => Self::Tar,
            _ => {
                return Err(Error::UnsupportedType {
                    tag: s.to_string(),
                })
            }
        };
        Ok(format)
    }
}
