//! # pluginkit-core
//!
//! Core library for pluginkit. Provides:
//! - The shared error taxonomy
//! - Plugin records and their on-disk `metadata.json` file
//! - Catalog and execution-backend contracts
//! - A registry wiring backends by id
//! - Platform naming and hierarchical configuration loading

pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod executor;
pub mod platform;
pub mod registry;
pub mod types;
pub mod utils;

pub use catalog::{Catalog, CatalogSettings, SearchCriteria};
pub use config::{ConfigLoader, PluginkitConfig};
pub use content::{FetchedPlugin, PluginContent, ReadSeek};
pub use error::{Error, IoResultExt, Result};
pub use executor::{ExecuteOptions, ExecuteResult, Executor};
pub use platform::Platform;
pub use registry::Registry;
pub use types::{PluginRecord, PluginStatus, RuntimeKind};

/// Cancellation signal threaded through every operation
pub use tokio_util::sync::CancellationToken;
