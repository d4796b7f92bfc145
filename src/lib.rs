// ABOUTME: Main library module for the harbinger task graph engine
// ABOUTME: Exports all core modules and provides the public API

pub mod agents;
pub mod cli;
pub mod engine;
pub mod output;
pub mod plan;
pub mod planner;
pub mod template;

// Re-export commonly used types
pub use agents::{AgentClient, AgentRegistry, TaskRequest, TaskResponse};
pub use cli::{App, Args, Config};
pub use engine::{
    ExecutionResult, ExecutionStatus, GraphExecutor, Orchestrator, PlanReport, PlanStatus,
    ResultStore,
};
pub use plan::{Plan, PlanParser, PlanValidator, Task};
pub use planner::{CompletionClient, Planner};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
