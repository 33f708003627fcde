//! Common test utilities for pluginkit-catalog

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;
pub mod mock_github;

pub use fixtures::*;
pub use mock_github::*;
