// ABOUTME: Main library module for the procflow process-tree runner
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod parser;
pub mod tasks;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use engine::{ExecutionContext, ExecutionError, ExitPolicy, Node, Pipeline};
pub use parser::{NodeConfig, ParserError};
pub use tasks::{CommandTask, Sink, Task};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
