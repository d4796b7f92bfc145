// ABOUTME: Plan data structure and JSON parsing of planner output
// ABOUTME: Defines the ordered task list and tolerant extraction of plan JSON from LLM replies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

use super::error::{PlanError, Result, ValidationError};
use super::task::Task;

const LABEL_KEYS: [&str; 3] = ["label", "folder_name", "name"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, alias = "folder_name", alias = "name")]
    pub label: String,
    pub tasks: Vec<Task>,
}

impl Plan {
    pub fn new(label: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            label: label.into(),
            tasks,
        }
    }

    /// Parse a plan from JSON text, rejecting plans without tasks
    pub fn from_json(content: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(extract_json(content))?;

        let map = match &mut value {
            Value::Object(map) => map,
            other => {
                return Err(PlanError::InvalidFormat(format!(
                    "expected a JSON object, found {}",
                    json_kind(other)
                )))
            }
        };
        if !map.get("tasks").ok_or(PlanError::MissingTasks)?.is_array() {
            return Err(PlanError::MissingTasks);
        }
        normalize_label(map);

        let plan: Plan = serde_json::from_value(value)?;
        plan.validate_structure()?;
        Ok(plan)
    }

    /// Basic structural checks that make a plan unusable
    fn validate_structure(&self) -> std::result::Result<(), ValidationError> {
        if self.tasks.is_empty() {
            return Err(ValidationError::EmptyPlan);
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(ValidationError::DuplicateTask {
                    task: task.id.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn task_ids(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.id.clone()).collect()
    }

    pub fn get_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(PlanError::JsonError)
    }
}

/// Reads plans saved on disk (e.g. by `harbinger plan --output`)
#[derive(Debug, Default)]
pub struct PlanParser;

impl PlanParser {
    pub fn new() -> Self {
        Self
    }

    pub async fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Plan> {
        let content = fs::read_to_string(path.as_ref()).await?;
        Plan::from_json(&content)
    }

    pub fn parse_str(&self, content: &str) -> Result<Plan> {
        Plan::from_json(content)
    }
}

/// Collapse `label`, `folder_name` and `name` into one `label`, first present wins
fn normalize_label(map: &mut Map<String, Value>) {
    let labels: Vec<Value> = LABEL_KEYS
        .iter()
        .filter_map(|key| map.remove(*key))
        .filter(|value| !value.is_null())
        .collect();
    if let Some(label) = labels.into_iter().next() {
        map.insert("label".to_string(), label);
    }
}

/// Strip markdown code fences some models wrap around JSON replies
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
