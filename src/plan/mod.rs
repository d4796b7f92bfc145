// ABOUTME: Plan module for planner-generated task graphs
// ABOUTME: Exports plan parsing, validation, and data structures

pub mod definition;
pub mod error;
pub mod task;
pub mod validation;

pub use definition::{Plan, PlanParser};
pub use error::{PlanError, ValidationError, ValidationWarning};
pub use task::{Params, Task, OUTPUT_DIR_KEY};
pub use validation::{PlanValidator, ValidationReport};
