//! Fetched plugin payloads

use crate::types::PluginRecord;
use bytes::Bytes;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek};

/// A readable source that can also be repositioned
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Raw plugin content as handed over by a catalog.
///
/// The format is unknown until the extraction pipeline sniffs it.
pub enum PluginContent {
    /// Fully buffered payload
    Bytes(Bytes),
    /// Live, forward-only stream
    Stream(Box<dyn Read + Send>),
    /// Stream that supports seeking back to the start
    Seekable(Box<dyn ReadSeek + Send>),
}

impl PluginContent {
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self::Stream(Box::new(reader))
    }

    pub fn from_file(file: File) -> Self {
        Self::Seekable(Box::new(file))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::Stream(_) => "stream",
            Self::Seekable(_) => "seekable",
        }
    }
}

impl fmt::Debug for PluginContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Seekable(_) => f.write_str("Seekable(..)"),
        }
    }
}

impl From<Vec<u8>> for PluginContent {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(value))
    }
}

impl From<Bytes> for PluginContent {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

/// Result of a catalog fetch: the catalog's record plus the payload
#[derive(Debug)]
pub struct FetchedPlugin {
    pub record: PluginRecord,
    pub content: PluginContent,
}
