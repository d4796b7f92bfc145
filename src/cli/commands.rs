// ABOUTME: Command implementations for the harbinger CLI
// ABOUTME: Wires configuration into the planner, agent registry, and orchestrator

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use crate::agents::{AgentRegistry, Catalogue, HealthState};
use crate::engine::{Dispatcher, GraphExecutor, Orchestrator, PlanReport, Recovery, Routing};
use crate::output::{formatter_for, write_output, OutputFormatter, ReportFormat, TextFormatter};
use crate::plan::PlanParser;
use crate::planner::{OpenAiClient, Planner};

pub fn build_registry(config: &Config) -> Result<Arc<AgentRegistry>> {
    let registry = AgentRegistry::from_specs(&config.agents, config.execution.dispatch_timeout)
        .context("Failed to create agent clients")?;
    Ok(Arc::new(registry))
}

pub fn build_planner(config: &Config) -> Result<Arc<Planner>> {
    let client = OpenAiClient::new(
        &config.planner.base_url,
        config.planner.model.clone(),
        config.planner.api_key.clone(),
        config.planner.timeout,
    )
    .context("Failed to create planner client")?;

    let planner = Planner::new(Arc::new(client), Catalogue::from_specs(&config.agents))?;
    Ok(Arc::new(planner))
}

pub fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let planner = build_planner(config)?;
    let dispatcher =
        Dispatcher::new(build_registry(config)?).with_timeout(config.execution.dispatch_timeout);
    let executor = GraphExecutor::new(dispatcher)
        .with_recovery(Recovery::new(planner.clone()))
        .with_max_retries(config.execution.max_retries);

    let routing = Routing::new(config.routing.output_root())
        .with_skip_agents(config.routing.skip_agents.clone());

    Ok(Orchestrator::new(planner, executor)
        .with_routing(routing)
        .with_strict_validation(config.execution.strict_validation))
}

/// Plan and execute a natural-language request
pub async fn run_request(
    request: String,
    output: Option<PathBuf>,
    format: Option<ReportFormat>,
    config: &Config,
) -> Result<()> {
    info!("Planning request: {}", request);

    let orchestrator = build_orchestrator(config)?;
    let report = orchestrator
        .submit_plan(&request)
        .await
        .map_err(|e| anyhow!("Request failed: {}", e))?;

    emit_report(&report, output.as_deref(), format).await
}

/// Generate a plan and print or save it
pub async fn plan_request(request: String, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let planner = build_planner(config)?;
    let plan = planner
        .plan(&request)
        .await
        .map_err(|e| anyhow!("Planning failed: {}", e))?;

    match output {
        Some(path) => {
            write_output(&plan.to_json_pretty()?, Some(&path)).await?;
            println!("✓ Plan '{}' saved to {}", plan.label, path.display());
        }
        None => println!("{}", TextFormatter::new().format_plan(&plan)?),
    }
    Ok(())
}

/// Execute a plan saved with `harbinger plan --output`
pub async fn exec_plan(
    plan_path: PathBuf,
    output: Option<PathBuf>,
    format: Option<ReportFormat>,
    config: &Config,
) -> Result<()> {
    info!("Loading plan: {}", plan_path.display());

    let plan = PlanParser::new()
        .parse_file(&plan_path)
        .await
        .map_err(|e| anyhow!("Failed to load plan: {}", e))?;

    let orchestrator = build_orchestrator(config)?;
    let report = orchestrator
        .execute_plan(plan)
        .await
        .map_err(|e| anyhow!("Plan execution failed: {}", e))?;

    emit_report(&report, output.as_deref(), format).await
}

/// Probe every configured agent and print its state
pub async fn check_health(config: &Config) -> Result<()> {
    let registry = build_registry(config)?;
    let report = registry.health_report(config.execution.health_timeout).await;

    let mut down = 0;
    for entry in &report {
        match &entry.state {
            HealthState::Up { capabilities } => {
                println!("✓ {:<12} UP ({} capabilities)", entry.agent, capabilities.len())
            }
            HealthState::Error { message } => {
                down += 1;
                println!("✗ {:<12} ERROR {}", entry.agent, message)
            }
            HealthState::Down { message } => {
                down += 1;
                println!("✗ {:<12} DOWN {}", entry.agent, message)
            }
        }
    }

    if down > 0 {
        return Err(anyhow!("{} of {} agents are not healthy", down, report.len()));
    }
    Ok(())
}

/// Print the configured agent catalogue
pub async fn list_agents(config: &Config) -> Result<()> {
    for (name, spec) in &config.agents {
        println!("{} ({})", name, spec.endpoint);
        if !spec.description.is_empty() {
            println!("  {}", spec.description);
        }
        for action in &spec.actions {
            println!("    - {}", action);
        }
    }
    Ok(())
}

async fn emit_report(
    report: &PlanReport,
    output: Option<&Path>,
    format: Option<ReportFormat>,
) -> Result<()> {
    match output {
        Some(path) => {
            let format = format.unwrap_or(ReportFormat::Json);
            write_output(&formatter_for(format).format_report(report)?, Some(path)).await?;
            println!("Plan '{}' finished with status: {}", report.plan_label, report.status);
        }
        None => {
            let format = format.unwrap_or_default();
            write_output(&formatter_for(format).format_report(report)?, None).await?
        }
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(anyhow!("Plan finished with status: {}", report.status))
    }
}
