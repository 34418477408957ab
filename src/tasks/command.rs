// ABOUTME: Command task implementation for running one external process
// ABOUTME: Redirects stdout/stderr to resolved sinks and reports timeouts distinctly from exit failures

use async_trait::async_trait;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, warn};

use super::stream::{Sink, StreamError, STDERR, STDOUT};
use super::Task;
use crate::engine::error::{ExecutionError, Result};
use crate::engine::ExecutionContext;

/// An operating-system command with its output redirections.
///
/// ## Example
///
/// ```yaml
/// path: sh
/// args: ["-c", "make all"]
/// stdout: build.log
/// stderr: devnul
/// ```
///
/// Empty `stdout`/`stderr` fall back to the host's own streams.
#[derive(Debug, Clone, Default)]
pub struct CommandTask {
    /// Executable path, looked up on `PATH` when relative.
    pub command: String,
    pub args: Vec<String>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandTask {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            ..Default::default()
        }
    }

    /// Open the `(stderr, stdout)` sinks. If the second fails the first is released.
    pub fn open_streams(&self) -> std::result::Result<(Sink, Sink), StreamError> {
        let stderr = Sink::resolve([self.stderr.as_str(), STDERR])
            .map_err(|e| StreamError::Stderr(Box::new(e)))?;

        match Sink::resolve([self.stdout.as_str(), STDOUT]) {
            Ok(stdout) => Ok((stderr, stdout)),
            Err(e) => {
                if let Err(close_err) = stderr.close() {
                    warn!("cannot close stderr: {}", close_err);
                }
                Err(StreamError::Stdout(Box::new(e)))
            }
        }
    }
}

#[async_trait]
impl Task for CommandTask {
    async fn run(&self, ctx: &ExecutionContext) -> Result<()> {
        let (stderr, stdout) = self.open_streams()?;

        if let Some(err) = ctx.err() {
            return Err(err);
        }

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(stdout.into_stdio())
            .stderr(stderr.into_stdio())
            .kill_on_drop(true);

        debug!("Command: {} {:?}", self.command, self.args);

        let spawned = cmd.spawn();
        // Releases the parent's handles on the sinks.
        drop(cmd);

        let outcome = match spawned {
            Ok(mut child) => {
                tokio::select! {
                    status = child.wait() => status.map_err(ExecutionError::Wait).and_then(exit_result),
                    _ = ctx.done() => {
                        if let Err(e) = child.kill().await {
                            warn!("cannot kill {}: {}", self.command, e);
                        }
                        Err(ExecutionError::Cancelled)
                    }
                }
            }
            Err(source) => Err(ExecutionError::Spawn {
                command: self.command.clone(),
                source,
            }),
        };

        // A process killed by the deadline reports the deadline, not its exit status.
        outcome.map_err(|err| ctx.err().unwrap_or(err))
    }
}

fn exit_result(status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    match status.code() {
        Some(code) => Err(ExecutionError::ExitStatus(code)),
        None => Err(ExecutionError::Signaled(status.signal().unwrap_or_default())),
    }
}
