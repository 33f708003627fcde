//! # pluginkit-extract
//!
//! Turns a fetched plugin payload of unknown format into files on disk.
//!
//! The payload's leading bytes select an [`ArchiveFormat`], which maps to a
//! fixed chain of [`Stage`]s (decompress, then untar or unzip). Content that
//! matches no format is written verbatim as the plugin executable. Every
//! archive entry must resolve inside the destination directory.

pub mod format;
pub mod path;
pub mod pipeline;
pub mod stage;

pub use format::{ArchiveFormat, Stage};
pub use path::contained_path;
pub use pipeline::{ExtractOutcome, ExtractionPipeline};
