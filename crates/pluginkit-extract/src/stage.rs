//! Decompression and unpacking stages

use crate::format::{Stage, BROTLI_MAGIC};
use crate::path::contained_path;
use pluginkit_core::{CancellationToken, Error, IoResultExt, ReadSeek, Result};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

const BROTLI_BUFFER_SIZE: usize = 4096;
const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Stream handed from one stage to the next
pub enum StageInput {
    Stream(Box<dyn Read + Send>),
    Seekable(Box<dyn ReadSeek + Send>),
}

impl StageInput {
    pub fn into_reader(self) -> Box<dyn Read + Send> {
        match self {
            Self::Stream(reader) => reader,
            Self::Seekable(reader) => Box::new(reader),
        }
    }
}

/// What a stage produced
pub enum StageOutput {
    /// Feed this stream to the next stage
    Next(StageInput),
    /// Entries were written; the chain is finished
    Done(Vec<PathBuf>),
}

/// Shared state for every stage of one extraction
pub struct StageContext<'a> {
    pub cancel: &'a CancellationToken,
    pub dest: &'a Path,
    pub file_mode: u32,
    pub dir_mode: u32,
}

impl StageContext<'_> {
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Run a single stage over `input`
pub fn run_stage(stage: Stage, ctx: &StageContext<'_>, input: StageInput) -> Result<StageOutput> {
    let next = |reader: Box<dyn Read + Send>| -> Result<StageOutput> {
        Ok(StageOutput::Next(StageInput::Stream(reader)))
    };

    match stage {
        Stage::Gunzip => next(Box::new(flate2::read::GzDecoder::new(input.into_reader()))),
        Stage::Unxz => next(Box::new(xz2::read::XzDecoder::new(input.into_reader()))),
        Stage::Bunzip2 => next(Box::new(bzip2::read::BzDecoder::new(input.into_reader()))),
        Stage::Unlz4 => next(Box::new(lz4_flex::frame::FrameDecoder::new(
            input.into_reader(),
        ))),
        Stage::Unzstd => {
            let decoder = zstd::stream::read::Decoder::new(input.into_reader())
                .io_context("initializing zstd decoder")?;
            next(Box::new(decoder))
        }
        Stage::Unbrotli => {
            let mut reader = BufReader::new(input.into_reader());
            let framed = reader
                .fill_buf()
                .io_context("reading brotli stream")?
                .starts_with(BROTLI_MAGIC);
            if framed {
                reader.consume(BROTLI_MAGIC.len());
            }
            next(Box::new(brotli::Decompressor::new(
                reader,
                BROTLI_BUFFER_SIZE,
            )))
        }
        Stage::Untar => untar(ctx, input.into_reader()).map(StageOutput::Done),
        Stage::Unzip => unzip(ctx, input).map(StageOutput::Done),
    }
}

fn archive_error(stage: &str, err: impl std::fmt::Display) -> Error {
    Error::archive(format!("{}: {}", stage, err))
}

fn untar(ctx: &StageContext<'_>, reader: Box<dyn Read + Send>) -> Result<Vec<PathBuf>> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| archive_error("reading tar archive", e))?;

    let mut written = Vec::new();
    for entry in entries {
        ctx.check_cancelled()?;

        let mut entry = entry.map_err(|e| archive_error("reading tar entry", e))?;
        let name = entry
            .path()
            .map_err(|e| archive_error("reading tar entry name", e))?
            .into_owned();
        let target = contained_path(ctx.dest, &name)?;
        let entry_type = entry.header().entry_type();
        let mode = entry.header().mode().ok();

        if entry_type.is_dir() {
            create_dir(&target, mode.unwrap_or(ctx.dir_mode))?;
        } else if entry_type.is_file() || entry_type == tar::EntryType::Continuous {
            if target == ctx.dest {
                debug!("Skipping tar file entry without a name: {}", name.display());
                continue;
            }
            write_file(&target, &mut entry, mode.unwrap_or(ctx.file_mode))?;
            written.push(target);
        } else {
            debug!(
                "Skipping tar entry {} of type {:?}",
                name.display(),
                entry_type
            );
        }
    }

    Ok(written)
}

fn unzip(ctx: &StageContext<'_>, input: StageInput) -> Result<Vec<PathBuf>> {
    let reader: Box<dyn ReadSeek + Send> = match input {
        StageInput::Seekable(reader) => reader,
        StageInput::Stream(mut reader) => {
            // Zip needs random access to the central directory
            let mut spool = tempfile::tempfile().io_context("creating zip spool file")?;
            io::copy(&mut reader, &mut spool).io_context("spooling zip archive")?;
            spool
                .seek(SeekFrom::Start(0))
                .io_context("rewinding zip spool file")?;
            Box::new(spool)
        }
    };

    let mut archive =
        zip::ZipArchive::new(reader).map_err(|e| archive_error("reading zip archive", e))?;

    let mut written = Vec::new();
    for i in 0..archive.len() {
        ctx.check_cancelled()?;

        let mut file = archive
            .by_index(i)
            .map_err(|e| archive_error("reading zip entry", e))?;
        let name = PathBuf::from(file.name());
        let target = contained_path(ctx.dest, &name)?;
        let mode = file.unix_mode();

        if file.is_dir() {
            create_dir(&target, mode.unwrap_or(ctx.dir_mode))?;
        } else if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
            debug!("Skipping zip symlink entry {}", name.display());
        } else {
            if target == ctx.dest {
                debug!("Skipping zip entry without a name");
                continue;
            }
            write_file(&target, &mut file, mode.unwrap_or(ctx.file_mode))?;
            written.push(target);
        }
    }

    Ok(written)
}

fn create_dir(path: &Path, mode: u32) -> Result<()> {
    debug!("Creating directory {}", path.display());
    fs::create_dir_all(path).io_context(format!("creating directory {}", path.display()))?;
    // Later entries still have to be written into it
    set_mode(path, mode | 0o700)
}

/// Copy `reader` to `path`, creating parent directories and applying `mode`
pub fn write_file(path: &Path, reader: &mut dyn Read, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .io_context(format!("creating directory {}", parent.display()))?;
    }

    debug!("Writing {}", path.display());
    let mut file = File::create(path).io_context(format!("creating {}", path.display()))?;
    io::copy(reader, &mut file).map_err(|e| {
        if e.kind() == io::ErrorKind::InvalidData || e.kind() == io::ErrorKind::UnexpectedEof {
            archive_error(&format!("decoding {}", path.display()), e)
        } else {
            Error::io(format!("writing {}", path.display()), e)
        }
    })?;

    set_mode(path, mode)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
        .io_context(format!("setting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
