// ABOUTME: Exit policies and the policy loop that re-invokes a task according to them
// ABOUTME: Each run yields independent restart/notify decisions that drive the loop

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, Instrument, Span};

use super::context::ExecutionContext;
use super::error::Result;
use crate::tasks::{Task, TaskRef};

/// What happens after a task returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Run once, swallow the result.
    None,
    /// Run forever; only cancellation ends the loop.
    Restart,
    /// Rerun until the task succeeds.
    RestartIfError,
    /// Run once and report the result, success included.
    Propagate,
    /// Run once and report failures only.
    #[default]
    PropagateIfError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub restart: bool,
    pub notify: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown exit policy '{0}'")]
pub struct UnknownPolicy(pub String);

impl ExitPolicy {
    pub const ALL: [ExitPolicy; 5] = [
        ExitPolicy::None,
        ExitPolicy::Restart,
        ExitPolicy::RestartIfError,
        ExitPolicy::Propagate,
        ExitPolicy::PropagateIfError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitPolicy::None => "none",
            ExitPolicy::Restart => "restart",
            ExitPolicy::RestartIfError => "restart-if-error",
            ExitPolicy::Propagate => "propagate",
            ExitPolicy::PropagateIfError => "propagate-if-error",
        }
    }

    /// Resolve an `onExit` token, falling back to the default for unknown tokens.
    pub fn from_token(token: &str) -> Self {
        token.parse().unwrap_or_default()
    }

    pub fn decide(&self, failed: bool) -> Decision {
        let (restart, notify) = match self {
            ExitPolicy::None => (false, false),
            ExitPolicy::Restart => (true, false),
            ExitPolicy::RestartIfError => (failed, false),
            ExitPolicy::Propagate => (false, true),
            ExitPolicy::PropagateIfError => (false, failed),
        };

        Decision { restart, notify }
    }
}

impl FromStr for ExitPolicy {
    type Err = UnknownPolicy;

    fn from_str(token: &str) -> std::result::Result<Self, Self::Err> {
        match token.trim() {
            "" => Ok(ExitPolicy::default()),
            "none" => Ok(ExitPolicy::None),
            "restart" => Ok(ExitPolicy::Restart),
            "restart-if-error" | "restart-if-err" => Ok(ExitPolicy::RestartIfError),
            "propagate" => Ok(ExitPolicy::Propagate),
            "propagate-if-error" | "propagate-if-err" => Ok(ExitPolicy::PropagateIfError),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for ExitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction-time settings for a runnable. Never mutated once the runnable exists.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub span: Span,
    pub policy: ExitPolicy,
}

impl LoopConfig {
    pub fn new(span: Span, policy: ExitPolicy) -> Self {
        Self { span, policy }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::new(Span::none(), ExitPolicy::default())
    }
}

/// Re-invokes a task until its policy says to stop.
pub struct PolicyLoop {
    task: TaskRef,
    config: LoopConfig,
}

impl PolicyLoop {
    pub fn new(task: TaskRef, config: LoopConfig) -> Self {
        Self { task, config }
    }

    pub fn policy(&self) -> ExitPolicy {
        self.config.policy
    }

    async fn drive(&self, ctx: &ExecutionContext) -> Result<()> {
        let policy = self.policy();
        debug!(%policy, "starting loop");

        let result = loop {
            let result = self.task.run(ctx).await;
            let decision = policy.decide(result.is_err());

            if decision.notify {
                break result;
            }

            if !decision.restart {
                break Ok(());
            }

            if let Err(e) = &result {
                info!(error = %e, "ignoring error");
            }

            if ctx.is_done() {
                debug!("context done, not restarting");
                break Ok(());
            }

            tokio::task::yield_now().await;
        };

        debug!(%policy, "closing loop");
        result
    }
}

#[async_trait]
impl Task for PolicyLoop {
    async fn run(&self, ctx: &ExecutionContext) -> Result<()> {
        self.drive(ctx).instrument(self.config.span.clone()).await
    }
}
