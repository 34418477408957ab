// ABOUTME: Execution engine for process-tree pipelines
// ABOUTME: Exit-policy loops, serial and parallel composers, and the executable node tree

pub mod context;
pub mod error;
pub mod node;
pub mod parallel;
pub mod pipeline;
pub mod policy;
pub mod serial;

#[cfg(test)]
pub(crate) mod testing;

pub use context::ExecutionContext;
pub use error::{ExecutionError, Result};
pub use node::Node;
pub use parallel::Parallel;
pub use pipeline::{exit_code, Pipeline, FALLBACK_EXIT_CODE};
pub use policy::{Decision, ExitPolicy, LoopConfig, PolicyLoop};
pub use serial::Serial;
