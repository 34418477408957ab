// ABOUTME: Executable node tree built once from the parsed pipeline definition
// ABOUTME: Each node resolves to a command, serial, or parallel runnable wrapped in its policy loop

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, warn, Instrument, Span};

use super::context::ExecutionContext;
use super::error::Result;
use super::parallel::Parallel;
use super::policy::{ExitPolicy, LoopConfig, PolicyLoop};
use super::serial::Serial;
use crate::parser::validation::node_diagnostics;
use crate::parser::{NodeConfig, NodeKind};
use crate::tasks::{CommandTask, Task, TaskRef};

/// A node of the executable tree.
///
/// Immutable once built; running it twice starts from scratch.
pub struct Node {
    id: String,
    kind: NodeKind,
    policy: ExitPolicy,
    timeout: Option<Duration>,
    children: usize,
    span: Span,
    task: PolicyLoop,
}

impl Node {
    /// Build the runnable for `config` and, recursively, its children.
    ///
    /// `parent` is the logging span handed down from the enclosing node; the
    /// node's own span is derived from it and handed to its children in turn.
    pub fn build(config: &NodeConfig, parent: &Span) -> Self {
        let id = config.id();
        let kind = config.kind();
        let policy = ExitPolicy::from_token(&config.on_exit);
        let span = info_span!(parent: parent, "task", task = %id);

        for diagnostic in node_diagnostics(config) {
            span.in_scope(|| warn!("{}", diagnostic));
        }

        let (task, children): (TaskRef, usize) = match kind {
            NodeKind::Command => {
                let command = CommandTask {
                    command: config.command.clone(),
                    args: config.args.clone(),
                    stdout: config.stdout.clone(),
                    stderr: config.stderr.clone(),
                };
                (Arc::new(command), 0)
            }
            NodeKind::Parallel => {
                let tasks: Vec<(TaskRef, ExitPolicy)> = config
                    .parallel
                    .iter()
                    .map(|child| {
                        // The child's own loop applies its policy; the group only
                        // hears about the errors that loop lets through.
                        let child = Node::build(child, &span);
                        (Arc::new(child) as TaskRef, ExitPolicy::PropagateIfError)
                    })
                    .collect();
                let count = tasks.len();
                (Arc::new(Parallel::new(tasks, span.clone())), count)
            }
            NodeKind::Serial | NodeKind::Empty => {
                let tasks: Vec<TaskRef> = config
                    .steps
                    .iter()
                    .map(|child| Arc::new(Node::build(child, &span)) as TaskRef)
                    .collect();
                let count = tasks.len();
                let config = LoopConfig::new(span.clone(), policy);
                (Arc::new(Serial::new(tasks, config)), count)
            }
        };

        // A parallel group is run once.
        let loop_policy = match kind {
            NodeKind::Parallel => ExitPolicy::default(),
            _ => policy,
        };
        let task = PolicyLoop::new(task, LoopConfig::new(span.clone(), loop_policy));

        Self {
            id,
            kind,
            policy,
            timeout: config.timeout.filter(|t| !t.is_zero()),
            children,
            span,
            task,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn policy(&self) -> ExitPolicy {
        self.policy
    }

    /// Number of direct children that will run.
    pub fn children(&self) -> usize {
        self.children
    }

    async fn drive(&self, ctx: &ExecutionContext) -> Result<()> {
        let result = match self.timeout {
            Some(timeout) => {
                info!(?timeout, "set timeout");
                let scope = ctx.with_timeout(timeout);
                let _release = scope.cancel_on_drop();
                self.task.run(&scope).await
            }
            None => self.task.run(ctx).await,
        };

        result.map_err(|e| e.in_task(self.id.as_str()))
    }
}

#[async_trait]
impl Task for Node {
    async fn run(&self, ctx: &ExecutionContext) -> Result<()> {
        self.drive(ctx).instrument(self.span.clone()).await
    }
}
