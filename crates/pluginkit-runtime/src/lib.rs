//! # pluginkit-runtime
//!
//! Execution backends implementing [`pluginkit_core::Executor`].

pub mod native;

pub use native::NativeExecutor;
