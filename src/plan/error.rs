// ABOUTME: Error types for plan parsing and validation
// ABOUTME: Defines specific error types for plan module operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Failed to read plan file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse plan JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid plan format: {0}")]
    InvalidFormat(String),

    #[error("Plan is missing a 'tasks' array")]
    MissingTasks,

    #[error("Validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Empty plan: no tasks defined")]
    EmptyPlan,

    #[error("Duplicate task id: {task}")]
    DuplicateTask { task: String },

    #[error("Task '{task}' has an empty '{field}' field")]
    EmptyField { task: String, field: String },
}

/// Structural problems that do not stop execution. Plan order stays
/// authoritative, these are only surfaced to the caller and the logs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    #[error("Task '{task}' depends on '{dependency}' which appears later in the plan")]
    ForwardReference { task: String, dependency: String },

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Task '{task}' depends on itself")]
    SelfDependency { task: String },

    #[error("Circular dependency detected in tasks: {tasks:?}")]
    CircularDependency { tasks: Vec<String> },

    #[error("Task '{task}' targets unregistered agent '{agent}'")]
    UnknownAgent { task: String, agent: String },

    #[error("Task '{task}' reuses an id that already has a recorded result")]
    ShadowsPriorResult { task: String },
}

pub type Result<T> = std::result::Result<T, PlanError>;
