//! Error types for pluginkit

use thiserror::Error;

/// Result type alias using pluginkit-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by every pluginkit crate
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing configuration, or an invalid argument
    #[error("Invalid configuration: {message}")]
    Validation { message: String },

    /// The catalog has no such plugin or version
    #[error("Plugin not found in catalog: {name}")]
    NotFound { name: String },

    /// The catalog backend failed
    #[error("Catalog error: {message}")]
    Upstream { message: String },

    #[error("Plugin already installed: {name}")]
    AlreadyInstalled { name: String },

    #[error("Plugin not installed: {name}")]
    NotInstalled { name: String },

    #[error("Plugin {name} is already at version {version}")]
    AlreadyAtVersion { name: String, version: String },

    /// An archive entry resolved outside of the destination directory
    #[error("Archive entry escapes the destination directory: {entry}")]
    PathTraversal { entry: String },

    /// Unknown archive format tag
    #[error("Unsupported content type: {tag}")]
    UnsupportedType { tag: String },

    #[error("Operation cancelled")]
    Cancelled,

    /// Filesystem error with the operation that caused it
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Plugin record could not be encoded or decoded
    #[error("Invalid plugin record: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive body is corrupt or truncated
    #[error("Invalid archive: {message}")]
    Archive { message: String },

    /// No asset carries the plugin name
    #[error("No candidate assets found for {name}")]
    NoCandidates { name: String },

    /// Candidates exist but none matches the requested platform or version
    #[error("No matching asset found for {name} {version} ({os}/{arch})")]
    NoMatch {
        name: String,
        version: String,
        os: String,
        arch: String,
    },
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a catalog not-found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an upstream catalog error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn already_installed(name: impl Into<String>) -> Self {
        Self::AlreadyInstalled { name: name.into() }
    }

    pub fn not_installed(name: impl Into<String>) -> Self {
        Self::NotInstalled { name: name.into() }
    }

    pub fn already_at_version(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::AlreadyAtVersion {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn path_traversal(entry: impl Into<String>) -> Self {
        Self::PathTraversal {
            entry: entry.into(),
        }
    }

    /// Wrap an IO error with the operation that produced it
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    /// True for cancellation, however deep it was raised
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// True for state-precondition violations that leave disk state untouched
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyInstalled { .. } | Self::NotInstalled { .. } | Self::AlreadyAtVersion { .. }
        )
    }
}

/// Attach operation context to `std::io::Result`
pub trait IoResultExt<T> {
    fn io_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn io_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::io(context, e))
    }
}
