//! Common test utilities for pluginkit-extract
//!
//! Archive builders producing every supported payload format in memory.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod archives;

pub use archives::*;
