// ABOUTME: Error types for pipeline execution
// ABOUTME: Each wrapping variant adds one breadcrumb to the causal chain from root to failing leaf

use thiserror::Error;

use crate::tasks::StreamError;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("task {task_id}: {source}")]
    Task {
        task_id: String,
        #[source]
        source: Box<ExecutionError>,
    },

    #[error("iteration aborted: {0}")]
    IterationAborted(#[source] Box<ExecutionError>),

    #[error("exit status {0}")]
    ExitStatus(i32),

    #[error("signal: {0}")]
    Signaled(i32),

    #[error("cannot execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("wait error: {0}")]
    Wait(#[source] std::io::Error),

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("context canceled")]
    Cancelled,

    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("{0}")]
    Failed(String),
}

impl ExecutionError {
    /// Wraps `self` with the identity of the node it surfaced from.
    pub fn in_task(self, task_id: impl Into<String>) -> Self {
        ExecutionError::Task {
            task_id: task_id.into(),
            source: Box::new(self),
        }
    }

    pub fn iteration_aborted(self) -> Self {
        ExecutionError::IterationAborted(Box::new(self))
    }

    /// Native exit status of the process at the bottom of the chain, if the
    /// chain ends in a nonzero exit.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionError::ExitStatus(code) => Some(*code),
            ExecutionError::Task { source, .. } | ExecutionError::IterationAborted(source) => {
                source.exit_code()
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;
