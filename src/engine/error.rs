// ABOUTME: Error types for plan execution
// ABOUTME: Task failures are results, not errors; these cover planning and engine faults

use thiserror::Error;

use crate::plan::{PlanError, ValidationError};
use crate::planner::PlannerError;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Planning failed: {0}")]
    Planning(#[from] PlannerError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Plan failed validation: {}", format_errors(.errors))]
    InvalidPlan { errors: Vec<ValidationError> },

    #[error("Recovery depth {depth} exceeds the limit of {limit}")]
    RecoveryDepthExceeded { depth: usize, limit: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ExecutionError>;
