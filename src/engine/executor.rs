// ABOUTME: Graph executor running plan tasks one at a time in authored order
// ABOUTME: Gates on dependencies, resolves placeholders, dispatches, and drives recovery and retry

use futures::future::BoxFuture;
use tracing::{error, info, instrument, warn};

use super::context::ResultStore;
use super::dispatch::Dispatcher;
use super::error::{ExecutionError, Result};
use super::recovery::Recovery;
use super::resolver;
use super::result::{ExecutionResult, Halt, SkippedTask};
use crate::plan::{Plan, Task};

/// A fix plan may not itself be repaired
pub const MAX_RECOVERY_DEPTH: usize = 1;

pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// What happened to the tasks of one plan, beyond the recorded results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    pub skipped: Vec<SkippedTask>,
    /// Tasks whose final result is a failure
    pub failed: Vec<String>,
    pub halted: Option<Halt>,
}

impl RunOutcome {
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }
}

pub struct GraphExecutor {
    dispatcher: Dispatcher,
    recovery: Option<Recovery>,
    max_retries: u32,
}

impl GraphExecutor {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            recovery: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_recovery(mut self, recovery: Recovery) -> Self {
        self.recovery = Some(recovery);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Execute `plan`, recording every result into `results`.
    ///
    /// Task failures never surface as `Err`; they are recorded and reflected
    /// in the returned outcome.
    #[instrument(skip(self, plan, results), fields(plan = %plan.label, tasks = plan.len()))]
    pub async fn run(
        &self,
        plan: &Plan,
        results: &mut ResultStore,
        is_fix_plan: bool,
    ) -> Result<RunOutcome> {
        let depth = if is_fix_plan { MAX_RECOVERY_DEPTH } else { 0 };
        self.run_at_depth(plan, results, depth).await
    }

    pub(crate) fn run_at_depth<'a>(
        &'a self,
        plan: &'a Plan,
        results: &'a mut ResultStore,
        depth: usize,
    ) -> BoxFuture<'a, Result<RunOutcome>> {
        Box::pin(async move {
            if depth > MAX_RECOVERY_DEPTH {
                return Err(ExecutionError::RecoveryDepthExceeded {
                    depth,
                    limit: MAX_RECOVERY_DEPTH,
                });
            }
            let is_fix_plan = depth > 0;
            let mut outcome = RunOutcome::default();

            for (index, task) in plan.tasks.iter().enumerate() {
                if !is_fix_plan {
                    let unmet = unmet_dependencies(task, results);
                    if !unmet.is_empty() {
                        info!("Skipping task {}: dependencies not met {:?}", task.id, unmet);
                        outcome.skipped.push(SkippedTask {
                            task_id: task.id.clone(),
                            unmet_dependencies: unmet,
                        });
                        continue;
                    }
                }

                let resolution = resolver::resolve(task, results);
                for placeholder in resolution.unresolved() {
                    warn!(
                        "Task {}: placeholder for '{}' left unresolved ({:?})",
                        task.id, placeholder.task_id, placeholder.outcome
                    );
                }

                info!("Executing task {} ({})", task.id, task.action);
                let mut result = self.execute_task(&resolution.task, results, depth).await;
                result.fix_step = is_fix_plan;
                let succeeded = result.is_success();
                let error = result.error_message.clone().unwrap_or_default();
                results.record(result);

                if succeeded {
                    info!("Task {} completed", task.id);
                    continue;
                }

                outcome.failed.push(task.id.clone());
                if is_fix_plan {
                    warn!("Fix step {} failed, continuing: {}", task.id, error);
                    continue;
                }

                let not_attempted: Vec<String> =
                    plan.tasks[index + 1..].iter().map(|t| t.id.clone()).collect();
                error!(
                    "Task {} failed permanently, halting plan ({} task(s) not attempted): {}",
                    task.id,
                    not_attempted.len(),
                    error
                );
                outcome.halted = Some(Halt {
                    task_id: task.id.clone(),
                    error,
                    not_attempted,
                });
                break;
            }

            Ok(outcome)
        })
    }

    /// Dispatch a resolved task, repairing and retrying while the budget allows
    async fn execute_task(
        &self,
        task: &Task,
        results: &mut ResultStore,
        depth: usize,
    ) -> ExecutionResult {
        let mut attempts = 1;
        let mut result = self.dispatcher.dispatch(task).await;

        while !result.is_success() && depth < MAX_RECOVERY_DEPTH {
            let Some(recovery) = &self.recovery else {
                break;
            };
            if !result.is_recoverable() {
                info!("Task {} failure is not recoverable", task.id);
                break;
            }
            if attempts > self.max_retries {
                info!("Task {} exhausted its retry budget", task.id);
                break;
            }

            let error = result.error_message.clone().unwrap_or_default();
            result.attempts = attempts;
            // the fix plan sees the failed attempt in its context
            results.record(result.clone());

            if !recovery.recover(self, task, &error, results, depth).await {
                warn!("Recovery for task {} did not succeed", task.id);
                break;
            }

            info!("Retrying task {} after recovery", task.id);
            attempts += 1;
            result = self.dispatcher.dispatch(task).await;
        }

        result.attempts = attempts;
        result
    }
}

fn unmet_dependencies(task: &Task, results: &ResultStore) -> Vec<String> {
    task.depends_on
        .iter()
        .filter(|dep| !results.succeeded(dep))
        .cloned()
        .collect()
}
