//! # pluginkit-manager
//!
//! [`LifecycleManager`] sequences fetch, extraction and record persistence
//! for plugins under one root directory:
//!
//! ```text
//! <root>/
//! ├── hello/
//! │   ├── metadata.json
//! │   └── hello
//! └── calc/
//!     ├── metadata.json
//!     └── calc.wasm
//! ```
//!
//! Install is all-or-nothing and upgrade keeps the previous install until the
//! new one is in place.

mod guard;
pub mod manager;
pub mod rename;

pub use manager::LifecycleManager;
pub use rename::{DirRenamer, StdRenamer};
