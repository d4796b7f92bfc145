// ABOUTME: Error recovery that asks the planner for a fix plan and runs it
// ABOUTME: Fix plans inherit the failed task's workspace and run one level deep

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::context::ResultStore;
use super::executor::GraphExecutor;
use crate::plan::{PlanValidator, Task, ValidationWarning};
use crate::planner::{FixRequest, Planner};

#[derive(Debug, Clone)]
pub struct Recovery {
    planner: Arc<Planner>,
}

impl Recovery {
    pub fn new(planner: Arc<Planner>) -> Self {
        Self { planner }
    }

    /// Generate and run a fix plan for `failed_task`.
    ///
    /// Returns true when the fix plan ran to the end, even if some of its
    /// steps failed. Returns false if no usable fix plan could be produced,
    /// if one of its step ids already has a result, or if it could not be run.
    #[instrument(skip(self, executor, failed_task, error, results), fields(task = %failed_task.id))]
    pub async fn recover(
        &self,
        executor: &GraphExecutor,
        failed_task: &Task,
        error: &str,
        results: &mut ResultStore,
        depth: usize,
    ) -> bool {
        info!("Attempting recovery for task {}: {}", failed_task.id, error);

        let context = match results.to_context() {
            Ok(context) => context,
            Err(e) => {
                error!("Could not serialize results for recovery: {}", e);
                return false;
            }
        };
        let request = FixRequest {
            failed_task,
            error,
            context,
        };

        let mut fix_plan = match self.planner.fix_plan(&request).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!("No usable fix plan for task {}: {}", failed_task.id, e);
                return false;
            }
        };

        if let Some(output_dir) = failed_task.output_dir() {
            for task in &mut fix_plan.tasks {
                task.set_output_dir(output_dir);
            }
        }

        let report = PlanValidator::new()
            .with_known_agents(executor.dispatcher().registry().agent_names())
            .with_prior_results(results.task_ids())
            .validate(&fix_plan);
        for warning in &report.warnings {
            warn!("Fix plan warning: {}", warning);
        }
        // fix steps share the result store, so a reused id would overwrite a plan result
        let shadowed: Vec<&str> = report
            .warnings
            .iter()
            .filter_map(|w| match w {
                ValidationWarning::ShadowsPriorResult { task } => Some(task.as_str()),
                _ => None,
            })
            .collect();
        if !shadowed.is_empty() {
            warn!(
                "Rejecting fix plan for task {}: step ids {:?} already have results",
                failed_task.id, shadowed
            );
            return false;
        }

        info!(
            "Running fix plan with {} step(s) for task {}",
            fix_plan.len(),
            failed_task.id
        );

        match executor.run_at_depth(&fix_plan, results, depth + 1).await {
            Ok(outcome) => {
                if !outcome.failed.is_empty() {
                    warn!("Fix plan finished with failed steps: {:?}", outcome.failed);
                }
                true
            }
            Err(e) => {
                error!("Fix plan for task {} could not run: {}", failed_task.id, e);
                false
            }
        }
    }
}
