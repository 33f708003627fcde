//! Native process execution backend

use async_trait::async_trait;
use chrono::Utc;
use pluginkit_core::types::{read_record, validate_plugin_name};
use pluginkit_core::{
    CancellationToken, Error, ExecuteOptions, ExecuteResult, Executor, IoResultExt, Result,
};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs installed plugins as child processes
#[derive(Debug, Clone)]
pub struct NativeExecutor {
    root: PathBuf,
}

impl NativeExecutor {
    pub const ID: &'static str = "exec";

    /// Executor for plugins installed under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the executable for an installed, enabled plugin
    pub fn resolve(&self, plugin: &str) -> Result<PathBuf> {
        validate_plugin_name(plugin)?;
        let dir = self.root.join(plugin);
        let record = read_record(&dir)?.ok_or_else(|| Error::not_installed(plugin))?;
        if !record.is_enabled() {
            return Err(Error::validation(format!("plugin {} is disabled", plugin)));
        }

        let mut candidates = vec![dir.join(plugin)];
        if cfg!(windows) {
            candidates.insert(0, dir.join(format!("{}.exe", plugin)));
        }
        if !record.file_name.is_empty() {
            candidates.push(dir.join(&record.file_name));
        }

        candidates
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                Error::validation(format!(
                    "no executable for {} in {}",
                    plugin,
                    dir.display()
                ))
            })
    }
}

#[async_trait]
impl Executor for NativeExecutor {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn execute(
        &self,
        cancel: &CancellationToken,
        plugin: &str,
        options: ExecuteOptions,
    ) -> Result<ExecuteResult> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let program = self.resolve(plugin)?;
        let command_line = command_line(&program, &options.args);

        let mut cmd = Command::new(&program);
        cmd.args(&options.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(env) = &options.environment {
            cmd.env_clear().envs(env);
        }
        if let Some(dir) = &options.working_dir {
            cmd.current_dir(dir);
        }

        info!("Running {}", command_line);
        let start_time = Utc::now();
        let started = Instant::now();

        let child = cmd
            .spawn()
            .io_context(format!("spawning {}", program.display()))?;
        let pid = child.id();

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Cancelled {} (pid {:?}), killing it", plugin, pid);
                return Err(Error::Cancelled);
            }
            output = child.wait_with_output() => {
                output.io_context(format!("waiting for {}", program.display()))?
            }
        };

        let duration = started.elapsed();
        let exit_code = output.status.code().unwrap_or(-1);
        debug!("{} exited with {} after {:?}", plugin, exit_code, duration);

        Ok(ExecuteResult {
            exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            start_time,
            end_time: Utc::now(),
            duration,
            command_line,
            working_dir: options.working_dir,
            environment: options.environment,
            pid,
            success: exit_code == 0,
        })
    }
}

fn command_line(program: &Path, args: &[String]) -> String {
    std::iter::once(program.display().to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}
