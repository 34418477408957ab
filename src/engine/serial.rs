// ABOUTME: Serial composer running child tasks strictly one after another
// ABOUTME: Short-circuits on failure when the composer's own policy reports errors

use async_trait::async_trait;
use tracing::{debug, info, warn, Instrument};

use super::context::ExecutionContext;
use super::error::Result;
use super::policy::LoopConfig;
use crate::tasks::{Task, TaskRef};

pub struct Serial {
    tasks: Vec<TaskRef>,
    config: LoopConfig,
}

impl Serial {
    pub fn new(tasks: Vec<TaskRef>, config: LoopConfig) -> Self {
        Self { tasks, config }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    async fn drive(&self, ctx: &ExecutionContext) -> Result<()> {
        info!(steps = self.len(), "starting");

        for (step, task) in self.tasks.iter().enumerate() {
            debug!(step, "task");

            let err = match task.run(ctx).await {
                Ok(()) => continue,
                Err(err) => err,
            };

            // The composer's policy decides, not the child's.
            if self.config.policy.decide(true).notify {
                info!(step, "aborted");
                return Err(err.iteration_aborted());
            }

            warn!(step, error = %err, "unreported");
        }

        info!("done");
        Ok(())
    }
}

#[async_trait]
impl Task for Serial {
    async fn run(&self, ctx: &ExecutionContext) -> Result<()> {
        self.drive(ctx).instrument(self.config.span.clone()).await
    }
}
