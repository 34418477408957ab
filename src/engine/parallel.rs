// ABOUTME: Parallel composer running child tasks concurrently under their own policies
// ABOUTME: The first reported result wins and every remaining sibling is cancelled

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, debug_span, error, info, Instrument, Span};

use super::context::ExecutionContext;
use super::error::{ExecutionError, Result};
use super::policy::{ExitPolicy, LoopConfig, PolicyLoop};
use crate::tasks::{Task, TaskRef};

/// One concurrently running child, looped under its own policy.
struct Routine {
    task: Arc<PolicyLoop>,
    policy: ExitPolicy,
    span: Span,
}

pub struct Parallel {
    routines: Vec<Routine>,
    span: Span,
}

impl Parallel {
    /// Each task is paired with the policy that decides whether its result
    /// is reported to the group.
    pub fn new(tasks: Vec<(TaskRef, ExitPolicy)>, span: Span) -> Self {
        let routines = tasks
            .into_iter()
            .enumerate()
            .map(|(idx, (task, policy))| {
                let routine_span = debug_span!(parent: &span, "routine", routine = idx);
                let config = LoopConfig::new(routine_span.clone(), policy);
                Routine {
                    task: Arc::new(PolicyLoop::new(task, config)),
                    policy,
                    span: routine_span,
                }
            })
            .collect();

        Self { routines, span }
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    async fn drive(&self, ctx: &ExecutionContext) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        info!(num = self.len(), "starting");

        let scope = ctx.with_cancel();
        let _release = scope.cancel_on_drop();

        let mut routines = JoinSet::new();
        for routine in &self.routines {
            let task = Arc::clone(&routine.task);
            let policy = routine.policy;
            let scope = scope.clone();

            routines.spawn(
                async move {
                    let result = task.run(&scope).await;
                    policy.decide(result.is_err()).notify.then_some(result)
                }
                .instrument(routine.span.clone()),
            );
        }

        let published = tokio::select! {
            published = first_published(&mut routines) => Some(published),
            _ = ctx.done() => None,
        };

        // Children failing because the caller went away is still a shutdown.
        let published = published.filter(|_| !ctx.is_done());

        // Siblings must have released their processes before the group returns.
        scope.cancel();
        while let Some(joined) = routines.join_next().await {
            if let Err(e) = joined {
                error!("routine failed during shutdown: {}", e);
            }
        }
        debug!("routines stopped");

        match published {
            Some(result) => {
                match &result {
                    Ok(()) => info!("done"),
                    Err(e) => info!(result = %e, "done"),
                }
                result
            }
            None => {
                info!("context done");
                Ok(())
            }
        }
    }
}

/// The first result a routine reports, or `Ok` once every routine finished silently.
///
/// A routine that panics reports as soon as it is joined.
async fn first_published(routines: &mut JoinSet<Option<Result<()>>>) -> Result<()> {
    while let Some(joined) = routines.join_next().await {
        match joined {
            Ok(Some(result)) => return result,
            Ok(None) => {}
            Err(e) => {
                error!("routine failed: {}", e);
                return Err(ExecutionError::Failed(format!("routine failed: {}", e)));
            }
        }
    }

    debug!("routines completed");
    Ok(())
}

#[async_trait]
impl Task for Parallel {
    async fn run(&self, ctx: &ExecutionContext) -> Result<()> {
        self.drive(ctx).instrument(self.span.clone()).await
    }
}
