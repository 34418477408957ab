// ABOUTME: Runnable task seam and the native command task
// ABOUTME: Everything the engine runs, leaf or composite, implements Task

pub mod command;
pub mod stream;

pub use command::CommandTask;
pub use stream::{Sink, StreamError};

use async_trait::async_trait;
use std::sync::Arc;

use crate::engine::error::Result;
use crate::engine::ExecutionContext;

/// A unit of work bound to a cancellable execution scope.
///
/// Implementations must return promptly once `ctx` is done.
#[async_trait]
pub trait Task: Send + Sync {
    async fn run(&self, ctx: &ExecutionContext) -> Result<()>;
}

/// Shared handle to a runnable, as held by composers and spawned units.
pub type TaskRef = Arc<dyn Task>;
