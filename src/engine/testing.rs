// ABOUTME: In-memory tasks used by the engine's unit tests
// ABOUTME: Count their runs and fail, flake, or sleep on demand

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::context::ExecutionContext;
use super::error::{ExecutionError, Result};
use crate::tasks::Task;

/// Returns the same outcome on every run.
pub struct StaticTask {
    error: Option<&'static str>,
    runs: AtomicUsize,
}

impl StaticTask {
    pub fn succeeding() -> Self {
        Self {
            error: None,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            error: Some(message),
            runs: AtomicUsize::new(0),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Task for StaticTask {
    async fn run(&self, _ctx: &ExecutionContext) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        match self.error {
            Some(message) => Err(ExecutionError::Failed(message.to_string())),
            None => Ok(()),
        }
    }
}

/// Fails a fixed number of times, then succeeds.
pub struct FlakyTask {
    failures: usize,
    runs: AtomicUsize,
}

impl FlakyTask {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Task for FlakyTask {
    async fn run(&self, _ctx: &ExecutionContext) -> Result<()> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst);
        if run < self.failures {
            Err(ExecutionError::Failed(format!("flake {}", run)))
        } else {
            Ok(())
        }
    }
}

/// Sleeps, then returns its outcome. Stops early with the context error when cancelled.
pub struct SleepTask {
    delay: Duration,
    error: Option<&'static str>,
    completed: AtomicUsize,
    returned: AtomicUsize,
}

impl SleepTask {
    pub fn new(delay: Duration, error: Option<&'static str>) -> Self {
        Self {
            delay,
            error,
            completed: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
        }
    }

    /// Runs that have returned, cancelled or not.
    pub fn returned(&self) -> usize {
        self.returned.load(Ordering::SeqCst)
    }

    /// Runs that reached the end of their sleep.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Task for SleepTask {
    async fn run(&self, ctx: &ExecutionContext) -> Result<()> {
        let slept = tokio::select! {
            _ = tokio::time::sleep(self.delay) => true,
            _ = ctx.done() => false,
        };
        self.returned.fetch_add(1, Ordering::SeqCst);

        if !slept {
            return Err(ctx.err().unwrap_or(ExecutionError::Cancelled));
        }

        self.completed.fetch_add(1, Ordering::SeqCst);
        match self.error {
            Some(message) => Err(ExecutionError::Failed(message.to_string())),
            None => Ok(()),
        }
    }
}

/// Panics on every run.
pub struct PanicTask;

#[async_trait]
impl Task for PanicTask {
    async fn run(&self, _ctx: &ExecutionContext) -> Result<()> {
        panic!("routine blew up");
    }
}
