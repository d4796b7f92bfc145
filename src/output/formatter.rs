// ABOUTME: Output formatters for plans and execution reports (text, JSON, YAML)
// ABOUTME: Also renders the workflow table shown before a plan runs

use serde::{Deserialize, Serialize};

use super::error::Result;
use crate::engine::{ExecutionResult, ExecutionStatus, PlanReport};
use crate::plan::Plan;

const MAX_OUTPUT_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

pub trait OutputFormatter: Send + Sync {
    fn format_report(&self, report: &PlanReport) -> Result<String>;

    fn format_plan(&self, plan: &Plan) -> Result<String>;
}

pub fn formatter_for(format: ReportFormat) -> Box<dyn OutputFormatter> {
    match format {
        ReportFormat::Text => Box::new(TextFormatter::new()),
        ReportFormat::Json => Box::new(JsonFormatter::new_pretty()),
        ReportFormat::Yaml => Box::new(YamlFormatter::new()),
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct YamlFormatter;

pub struct TextFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn new_pretty() -> Self {
        Self { pretty: true }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &PlanReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_plan(&self, plan: &Plan) -> Result<String> {
        self.to_json(plan)
    }
}

impl YamlFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YamlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for YamlFormatter {
    fn format_report(&self, report: &PlanReport) -> Result<String> {
        Ok(serde_yaml::to_string(report)?)
    }

    fn format_plan(&self, plan: &Plan) -> Result<String> {
        Ok(serde_yaml::to_string(plan)?)
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }

    fn format_result(&self, result: &ExecutionResult) -> String {
        let icon = match result.status {
            ExecutionStatus::Success => "✓",
            ExecutionStatus::Fail => "✗",
        };
        let mut output = format!("{} {} [{}]", icon, result.task_id, status_label(result));

        if result.fix_step {
            output.push_str(" (fix step)");
        }
        if result.attempts > 1 {
            output.push_str(&format!(" (attempted {} times)", result.attempts));
        }
        if let Some(uri) = &result.output_uri {
            output.push_str(&format!("\n    Output URI: {}", uri));
        }
        if let Some(data) = result.output_data.as_deref().filter(|d| !d.is_empty()) {
            output.push_str(&format!(
                "\n    Output: {}",
                truncate(data, MAX_OUTPUT_LENGTH).replace('\n', "\n    ")
            ));
        }
        if let Some(error) = &result.error_message {
            output.push_str(&format!("\n    Error: {}", error));
        }
        output
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TextFormatter {
    fn format_report(&self, report: &PlanReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("Plan: {} ({})\n", report.plan_label, report.run_id));
        output.push_str(&format!("Status: {}\n", report.status));
        if let Some(dir) = &report.output_dir {
            output.push_str(&format!("Workspace: {}\n", dir.display()));
        }
        let duration = (report.finished_at - report.started_at)
            .to_std()
            .unwrap_or_default();
        output.push_str(&format!("Duration: {:.2}s\n", duration.as_secs_f64()));

        let summary = report.summary();
        output.push_str("\nSummary:\n");
        output.push_str(&format!("  Results: {}\n", summary.total));
        output.push_str(&format!("  Succeeded: {}\n", summary.succeeded));
        output.push_str(&format!("  Failed: {}\n", summary.failed));
        output.push_str(&format!("  Skipped: {}\n", summary.skipped));
        output.push_str(&format!("  Not attempted: {}\n", summary.not_attempted));
        if summary.fix_steps > 0 {
            output.push_str(&format!("  Fix steps: {}\n", summary.fix_steps));
        }

        if !report.results.is_empty() {
            output.push_str("\nTasks:\n");
            for result in &report.results {
                for line in self.format_result(result).lines() {
                    output.push_str(&format!("  {}\n", line));
                }
            }
        }

        if !report.skipped.is_empty() {
            output.push_str("\nSkipped:\n");
            for skipped in &report.skipped {
                output.push_str(&format!(
                    "  ⊘ {} (waiting on {})\n",
                    skipped.task_id,
                    skipped.unmet_dependencies.join(", ")
                ));
            }
        }

        if let Some(halt) = &report.halted {
            output.push_str(&format!("\nHalted at task {}: {}\n", halt.task_id, halt.error));
            if !halt.not_attempted.is_empty() {
                output.push_str(&format!(
                    "  Not attempted: {}\n",
                    halt.not_attempted.join(", ")
                ));
            }
        }

        Ok(output)
    }

    fn format_plan(&self, plan: &Plan) -> Result<String> {
        let mut output = String::new();
        if !plan.label.is_empty() {
            output.push_str(&format!("Plan: {}\n\n", plan.label));
        }
        output.push_str(&render_workflow(plan));
        Ok(output)
    }
}

fn status_label(result: &ExecutionResult) -> String {
    match (result.status, result.failure) {
        (ExecutionStatus::Success, _) => "success".to_string(),
        (ExecutionStatus::Fail, Some(kind)) => format!("fail: {:?}", kind).to_lowercase(),
        (ExecutionStatus::Fail, None) => "fail".to_string(),
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len).collect();
    format!("{}... [truncated]", cut)
}

/// Table of the plan's tasks in execution order
pub fn render_workflow(plan: &Plan) -> String {
    const HEADERS: [&str; 4] = ["ID", "Agent", "Action", "Depends On"];

    let rows: Vec<[String; 4]> = plan
        .tasks
        .iter()
        .map(|task| {
            let depends = if task.depends_on.is_empty() {
                "-".to_string()
            } else {
                task.depends_on.join(", ")
            };
            [
                task.id.clone(),
                task.agent.clone(),
                task.action.clone(),
                depends,
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 4]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut output = format_row(HEADERS);
    output.push_str(&format!("|-{}-|\n", separator.join("-|-")));
    for row in &rows {
        output.push_str(&format_row([&row[0], &row[1], &row[2], &row[3]]));
    }
    output
}
