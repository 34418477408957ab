// ABOUTME: Pipeline entry point tying a parsed definition to its executable tree
// ABOUTME: Maps the root result to the host process exit code

use std::path::Path;
use tracing::Span;

use super::context::ExecutionContext;
use super::error::Result;
use super::node::Node;
use crate::parser::{self, LogConfig, NodeConfig};
use crate::tasks::Task;

/// Exit code for any failure that is not a process's own nonzero exit.
pub const FALLBACK_EXIT_CODE: i32 = 125;

pub struct Pipeline {
    definition: NodeConfig,
    root: Node,
}

impl Pipeline {
    /// Build the executable tree under the given logging span.
    pub fn new(definition: NodeConfig, span: &Span) -> Self {
        let root = Node::build(&definition, span);
        Self { definition, root }
    }

    pub fn from_yaml(content: &str, span: &Span) -> parser::Result<Self> {
        Ok(Self::new(NodeConfig::from_yaml(content)?, span))
    }

    pub fn from_file<P: AsRef<Path>>(path: P, span: &Span) -> parser::Result<Self> {
        Ok(Self::new(NodeConfig::from_file(path)?, span))
    }

    pub fn definition(&self) -> &NodeConfig {
        &self.definition
    }

    pub fn log_config(&self) -> &LogConfig {
        &self.definition.log
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Run the whole tree to completion.
    pub async fn run(&self) -> Result<()> {
        self.run_with(&ExecutionContext::background()).await
    }

    pub async fn run_with(&self, ctx: &ExecutionContext) -> Result<()> {
        self.root.run(ctx).await
    }
}

/// 0 on success, the failing process's own status when the chain ends in one,
/// [`FALLBACK_EXIT_CODE`] otherwise.
pub fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.exit_code().unwrap_or(FALLBACK_EXIT_CODE),
    }
}
