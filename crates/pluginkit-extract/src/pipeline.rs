//! Extraction pipeline: sniff, run the stage chain, copy what remains

use crate::format::{ArchiveFormat, SNIFF_LEN};
use crate::path::contained_path;
use crate::stage::{run_stage, write_file, StageContext, StageInput, StageOutput};
use pluginkit_core::{CancellationToken, Error, IoResultExt, PluginContent, Result};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What an extraction produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    /// Detected (or forced) format; `None` when the payload was copied raw
    pub format: Option<ArchiveFormat>,
    /// Regular files written beneath the destination
    pub files: Vec<PathBuf>,
}

/// Turns fetched plugin content into files under a destination directory
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    file_mode: u32,
    dir_mode: u32,
    executable_mode: u32,
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self {
            file_mode: 0o644,
            dir_mode: 0o755,
            executable_mode: 0o755,
        }
    }
}

impl ExtractionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode for archive files that carry none
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Mode for archive directories that carry none
    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Sniff `content` and extract it into `dest`.
    ///
    /// `file_name` names the output when the content is not an archive.
    /// Partial writes are left in place on failure; the caller owns cleanup.
    pub fn extract(
        &self,
        cancel: &CancellationToken,
        content: PluginContent,
        dest: &Path,
        file_name: &str,
    ) -> Result<ExtractOutcome> {
        self.extract_as(cancel, content, dest, file_name, None)
    }

    /// Like [`extract`](Self::extract), but `format` bypasses sniffing when set
    pub fn extract_as(
        &self,
        cancel: &CancellationToken,
        content: PluginContent,
        dest: &Path,
        file_name: &str,
        format: Option<ArchiveFormat>,
    ) -> Result<ExtractOutcome> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let (header, mut input) = normalize(content)?;
        let format = format.or_else(|| ArchiveFormat::sniff(&header));
        debug!(
            "Extracting into {} (format: {})",
            dest.display(),
            format.map(|f| f.as_str()).unwrap_or("raw")
        );

        let ctx = StageContext {
            cancel,
            dest,
            file_mode: self.file_mode,
            dir_mode: self.dir_mode,
        };

        let stages = format.map(|f| f.stages()).unwrap_or(&[]);
        for (i, stage) in stages.iter().enumerate() {
            ctx.check_cancelled()?;
            debug!("Stage {}/{}: {}", i + 1, stages.len(), stage);

            match run_stage(*stage, &ctx, input)? {
                StageOutput::Next(next) => input = next,
                StageOutput::Done(files) => return Ok(ExtractOutcome { format, files }),
            }
        }

        ctx.check_cancelled()?;
        let target = contained_path(dest, Path::new(file_name))?;
        if target == dest {
            return Err(Error::validation(format!(
                "invalid output file name: {:?}",
                file_name
            )));
        }

        let mut reader = input.into_reader();
        write_file(&target, &mut reader, self.executable_mode)?;
        Ok(ExtractOutcome {
            format,
            files: vec![target],
        })
    }
}

/// Read the sniff header and return a stream that still starts at byte zero
fn normalize(content: PluginContent) -> Result<(Vec<u8>, StageInput)> {
    match content {
        PluginContent::Bytes(bytes) => {
            let header = bytes[..bytes.len().min(SNIFF_LEN)].to_vec();
            Ok((header, StageInput::Seekable(Box::new(Cursor::new(bytes)))))
        }
        PluginContent::Stream(mut reader) => {
            let header = read_header(&mut reader)?;
            let replay = Cursor::new(header.clone()).chain(reader);
            Ok((header, StageInput::Stream(Box::new(replay))))
        }
        PluginContent::Seekable(mut reader) => {
            let start = reader
                .stream_position()
                .io_context("reading content position")?;
            let header = read_header(&mut reader)?;
            reader
                .seek(SeekFrom::Start(start))
                .io_context("rewinding content")?;
            Ok((header, StageInput::Seekable(reader)))
        }
    }
}

fn read_header(reader: &mut dyn Read) -> Result<Vec<u8>> {
    let mut header = Vec::with_capacity(SNIFF_LEN);
    reader
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)
        .io_context("reading content header")?;
    Ok(header)
}
