// ABOUTME: Task graph execution engine for planner-generated plans
// ABOUTME: Handles placeholder resolution, dispatch, bounded recovery, and orchestration

pub mod context;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod recovery;
pub mod resolver;
pub mod result;

pub use context::ResultStore;
pub use dispatch::{DispatchError, Dispatcher, DEFAULT_DISPATCH_TIMEOUT};
pub use error::{ExecutionError, Result};
pub use executor::{GraphExecutor, RunOutcome, DEFAULT_MAX_RETRIES, MAX_RECOVERY_DEPTH};
pub use orchestrator::{workspace_name, Orchestrator, Routing};
pub use recovery::Recovery;
pub use resolver::{resolve, Placeholder, PlaceholderOutcome, Resolution};
pub use result::{
    ExecutionResult, ExecutionStatus, FailureKind, Halt, PlanReport, PlanStatus, PlanSummary,
    SkippedTask,
};
