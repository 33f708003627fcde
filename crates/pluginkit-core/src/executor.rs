//! Execution-backend contract

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Options for a single plugin run
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub args: Vec<String>,
    /// Replaces the inherited environment when set
    pub environment: Option<BTreeMap<String, String>>,
    pub working_dir: Option<PathBuf>,
}

/// Outcome of a finished plugin run
#[derive(Debug, Clone)]
pub struct ExecuteResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: Duration,
    pub command_line: String,
    pub working_dir: Option<PathBuf>,
    pub environment: Option<BTreeMap<String, String>>,
    pub pid: Option<u32>,
    pub success: bool,
}

/// Runs installed plugins
#[async_trait]
pub trait Executor: Send + Sync {
    fn id(&self) -> &str;

    async fn execute(
        &self,
        cancel: &CancellationToken,
        plugin: &str,
        options: ExecuteOptions,
    ) -> Result<ExecuteResult>;
}
