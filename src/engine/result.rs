// ABOUTME: Execution result types for single tasks and complete plan runs
// ABOUTME: Defines task outcomes, failure classification, and the caller-facing PlanReport

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::agents::{ResponseStatus, TaskResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Fail,
}

/// Why a dispatch failed, which decides whether recovery may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No worker registered for the agent name. Never retried.
    Routing,
    Transport,
    Timeout,
    /// The worker answered but reported failure
    Business,
}

impl FailureKind {
    pub fn is_recoverable(self) -> bool {
        !matches!(self, FailureKind::Routing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub task_id: String,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Number of dispatches made for this task, including the retry
    #[serde(default = "one")]
    pub attempts: u32,
    /// Produced by a recovery fix plan rather than the plan itself
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fix_step: bool,
}

fn one() -> u32 {
    1
}

impl ExecutionResult {
    pub fn success(task_id: impl Into<String>, output_data: Option<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: ExecutionStatus::Success,
            output_uri: None,
            output_data,
            error_message: None,
            failure: None,
            attempts: 1,
            fix_step: false,
        }
    }

    pub fn failure(task_id: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: ExecutionStatus::Fail,
            output_uri: None,
            output_data: None,
            error_message: Some(message.into()),
            failure: Some(kind),
            attempts: 1,
            fix_step: false,
        }
    }

    /// Translate a worker reply; the result is keyed by our task id, not the echoed one
    pub fn from_response(task_id: &str, response: TaskResponse) -> Self {
        match response.status {
            ResponseStatus::Success => Self {
                task_id: task_id.to_string(),
                status: ExecutionStatus::Success,
                output_uri: response.result_uri,
                output_data: response.result_data,
                error_message: None,
                failure: None,
                attempts: 1,
                fix_step: false,
            },
            ResponseStatus::Fail => {
                let message = response
                    .error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Agent reported failure without a message".to_string());
                Self {
                    output_uri: response.result_uri,
                    output_data: response.result_data,
                    ..Self::failure(task_id, FailureKind::Business, message)
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    pub fn is_recoverable(&self) -> bool {
        !self.is_success() && self.failure.map_or(true, FailureKind::is_recoverable)
    }
}

/// A task the executor passed over because a dependency had not succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTask {
    pub task_id: String,
    pub unmet_dependencies: Vec<String>,
}

/// Where and why the top-level plan stopped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Halt {
    pub task_id: String,
    pub error: String,
    pub not_attempted: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Success,
    PartialSuccess,
    Failed,
    Halted,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Success => write!(f, "success"),
            PlanStatus::PartialSuccess => write!(f, "partial_success"),
            PlanStatus::Failed => write!(f, "failed"),
            PlanStatus::Halted => write!(f, "halted"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Plan tasks with a result; fix steps are counted separately
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub not_attempted: usize,
    pub fix_steps: usize,
}

/// Everything the caller learns about one plan execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub run_id: String,
    pub plan_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub status: PlanStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Per-task results in first-execution order, fix-plan steps included
    pub results: Vec<ExecutionResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halted: Option<Halt>,
}

impl PlanReport {
    pub fn new(
        plan_label: impl Into<String>,
        output_dir: Option<PathBuf>,
        started_at: DateTime<Utc>,
        results: Vec<ExecutionResult>,
        skipped: Vec<SkippedTask>,
        halted: Option<Halt>,
    ) -> Self {
        let status = Self::derive_status(&results, &skipped, halted.as_ref());
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            plan_label: plan_label.into(),
            output_dir,
            status,
            started_at,
            finished_at: Utc::now(),
            results,
            skipped,
            halted,
        }
    }

    fn derive_status(
        results: &[ExecutionResult],
        skipped: &[SkippedTask],
        halted: Option<&Halt>,
    ) -> PlanStatus {
        if halted.is_some() {
            return PlanStatus::Halted;
        }
        let (total, succeeded) = results
            .iter()
            .filter(|r| !r.fix_step)
            .fold((0, 0), |(total, ok), r| (total + 1, ok + usize::from(r.is_success())));
        if succeeded == 0 {
            return PlanStatus::Failed;
        }
        if succeeded == total && skipped.is_empty() {
            PlanStatus::Success
        } else {
            PlanStatus::PartialSuccess
        }
    }

    pub fn get(&self, task_id: &str) -> Option<&ExecutionResult> {
        self.results.iter().find(|r| r.task_id == task_id)
    }

    pub fn is_success(&self) -> bool {
        self.status == PlanStatus::Success
    }

    /// Results of the plan's own tasks, without fix-plan steps
    pub fn plan_results(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| !r.fix_step)
    }

    pub fn summary(&self) -> PlanSummary {
        let total = self.plan_results().count();
        let succeeded = self.plan_results().filter(|r| r.is_success()).count();
        PlanSummary {
            total,
            succeeded,
            failed: total - succeeded,
            skipped: self.skipped.len(),
            not_attempted: self
                .halted
                .as_ref()
                .map_or(0, |h| h.not_attempted.len()),
            fix_steps: self.results.len() - total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skipped(id: &str) -> SkippedTask {
        SkippedTask {
            task_id: id.to_string(),
            unmet_dependencies: vec!["1".to_string()],
        }
    }

    #[test]
    fn test_from_business_failure() {
        let result = ExecutionResult::from_response("2", TaskResponse::fail("x", "quota exceeded"));
        assert_eq!(result.task_id, "2");
        assert_eq!(result.status, ExecutionStatus::Fail);
        assert_eq!(result.failure, Some(FailureKind::Business));
        assert_eq!(result.error_message.as_deref(), Some("quota exceeded"));
        assert!(result.is_recoverable());
    }

    #[test]
    fn test_failure_without_message() {
        let mut response = TaskResponse::fail("2", "");
        response.error_message = None;
        let result = ExecutionResult::from_response("2", response);
        assert!(result.error_message.unwrap().contains("without a message"));
    }

    #[test]
    fn test_routing_failure_not_recoverable() {
        let result = ExecutionResult::failure("1", FailureKind::Routing, "Unknown agent: fax");
        assert!(!result.is_recoverable());
    }

    #[test]
    fn test_report_status() {
        let ok = ExecutionResult::success("1", None);
        let bad = ExecutionResult::failure("2", FailureKind::Transport, "refused");
        let now = Utc::now();

        let report = PlanReport::new("p", None, now, vec![ok.clone()], vec![], None);
        assert_eq!(report.status, PlanStatus::Success);

        let report = PlanReport::new("p", None, now, vec![ok.clone()], vec![skipped("2")], None);
        assert_eq!(report.status, PlanStatus::PartialSuccess);

        let report = PlanReport::new("p", None, now, vec![], vec![skipped("2")], None);
        assert_eq!(report.status, PlanStatus::Failed);

        let halt = Halt {
            task_id: "2".to_string(),
            error: "refused".to_string(),
            not_attempted: vec!["3".to_string()],
        };
        let report = PlanReport::new("p", None, now, vec![ok, bad], vec![], Some(halt));
        assert_eq!(report.status, PlanStatus::Halted);
        assert_eq!(
            report.summary(),
            PlanSummary {
                total: 2,
                succeeded: 1,
                failed: 1,
                skipped: 0,
                not_attempted: 1,
                fix_steps: 0,
            }
        );
    }

    #[test]
    fn test_failed_fix_step_does_not_affect_status() {
        let mut failed_step = ExecutionResult::failure("f1", FailureKind::Business, "no such file");
        failed_step.fix_step = true;
        let mut fixed_step = ExecutionResult::success("f2", None);
        fixed_step.fix_step = true;
        let mut retried = ExecutionResult::success("1", Some("sent".into()));
        retried.attempts = 2;

        let report = PlanReport::new(
            "p",
            None,
            Utc::now(),
            vec![retried, failed_step, fixed_step],
            vec![],
            None,
        );

        assert_eq!(report.status, PlanStatus::Success);
        let summary = report.summary();
        assert_eq!((summary.total, summary.succeeded, summary.failed), (1, 1, 0));
        assert_eq!(summary.fix_steps, 2);
    }

    #[test]
    fn test_result_serialization_skips_empty_fields() {
        let value = serde_json::to_value(ExecutionResult::success("1", Some("ok".into()))).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"task_id": "1", "status": "success", "output_data": "ok", "attempts": 1})
        );
    }
}
