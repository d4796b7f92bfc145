// ABOUTME: Engine facade that plans a request, routes it to a workspace, and executes it
// ABOUTME: Produces the PlanReport returned to CLI callers

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::context::ResultStore;
use super::error::{ExecutionError, Result};
use super::executor::GraphExecutor;
use super::result::PlanReport;
use crate::output::render_workflow;
use crate::plan::{Plan, PlanValidator};
use crate::planner::Planner;

pub const DEFAULT_WORKSPACE: &str = "default_task";
const WORKSPACE_NAME_LIMIT: usize = 50;

/// Agents that do not receive an injected `output_dir`
pub const DEFAULT_SKIP_AGENTS: &[&str] = &["os", "calendar", "browser"];

#[derive(Debug, Clone)]
pub struct Routing {
    pub output_root: PathBuf,
    pub skip_agents: Vec<String>,
}

impl Routing {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            skip_agents: DEFAULT_SKIP_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_skip_agents(mut self, skip_agents: Vec<String>) -> Self {
        self.skip_agents = skip_agents;
        self
    }

    pub fn workspace_for(&self, label: &str) -> PathBuf {
        self.output_root.join(workspace_name(label))
    }

    /// Point every artifact-producing task at `output_dir`
    pub fn route(&self, plan: &mut Plan, output_dir: &Path) {
        let output_dir = output_dir.to_string_lossy();
        for task in &mut plan.tasks {
            if !self.skip_agents.iter().any(|a| a == &task.agent) {
                task.set_output_dir(&output_dir);
            }
        }
    }
}

impl Default for Routing {
    fn default() -> Self {
        Self::new(default_output_root())
    }
}

/// `~/Documents/Harbinger`, or `./Harbinger` without a documents directory
pub fn default_output_root() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Harbinger")
}

/// Directory-safe name: ASCII alphanumerics kept, everything else `_`, at most 50 chars
pub fn workspace_name(label: &str) -> String {
    let name: String = label
        .trim()
        .chars()
        .take(WORKSPACE_NAME_LIMIT)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if name.is_empty() {
        DEFAULT_WORKSPACE.to_string()
    } else {
        name
    }
}

pub struct Orchestrator {
    planner: Arc<Planner>,
    executor: GraphExecutor,
    routing: Routing,
    strict_validation: bool,
}

impl Orchestrator {
    pub fn new(planner: Arc<Planner>, executor: GraphExecutor) -> Self {
        Self {
            planner,
            executor,
            routing: Routing::default(),
            strict_validation: false,
        }
    }

    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Plan a natural-language request and execute it to completion
    #[instrument(skip(self))]
    pub async fn submit_plan(&self, input: &str) -> Result<PlanReport> {
        let mut plan = self.planner.plan(input).await?;
        if plan.label.trim().is_empty() {
            plan.label = workspace_name(input);
        }
        self.execute_plan(plan).await
    }

    /// Execute a plan that has already been generated
    #[instrument(skip(self, plan), fields(plan = %plan.label))]
    pub async fn execute_plan(&self, mut plan: Plan) -> Result<PlanReport> {
        let started_at = Utc::now();

        let output_dir = self.routing.workspace_for(&plan.label);
        self.routing.route(&mut plan, &output_dir);
        info!("Workspace: {}", output_dir.display());
        info!("Workflow:\n{}", render_workflow(&plan));

        self.validate(&plan)?;

        let mut results = ResultStore::new();
        let outcome = self.executor.run(&plan, &mut results, false).await?;

        let report = PlanReport::new(
            plan.label,
            Some(output_dir),
            started_at,
            results.into_results(),
            outcome.skipped,
            outcome.halted,
        );
        info!("Plan finished with status {}", report.status);
        Ok(report)
    }

    fn validate(&self, plan: &Plan) -> Result<()> {
        let report = PlanValidator::new()
            .with_known_agents(self.executor.dispatcher().registry().agent_names())
            .validate(plan);

        for warning in &report.warnings {
            warn!("Plan warning: {}", warning);
        }
        if report.is_valid {
            return Ok(());
        }
        if self.strict_validation {
            return Err(ExecutionError::InvalidPlan {
                errors: report.errors,
            });
        }
        for error in &report.errors {
            warn!("Plan error (continuing): {}", error);
        }
        Ok(())
    }
}
