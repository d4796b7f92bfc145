// ABOUTME: Placeholder substitution of prior task outputs into task params
// ABOUTME: Rewrites {{task_id}} tokens in string values and reports every token's outcome

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

use super::context::ResultStore;
use crate::plan::Task;

/// `{{` optional whitespace, a task id, optional whitespace, `}}`
pub const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}";

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderOutcome {
    Resolved,
    /// The task has a result but it carries no output data
    NoOutput,
    /// No result recorded for the referenced task
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub task_id: String,
    pub outcome: PlaceholderOutcome,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub task: Task,
    pub placeholders: Vec<Placeholder>,
}

impl Resolution {
    /// Placeholders left in the params as literal text
    pub fn unresolved(&self) -> impl Iterator<Item = &Placeholder> {
        self.placeholders
            .iter()
            .filter(|p| p.outcome != PlaceholderOutcome::Resolved)
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved().next().is_none()
    }
}

/// Return a copy of `task` with placeholders in its params replaced by prior outputs
pub fn resolve(task: &Task, results: &ResultStore) -> Resolution {
    let mut resolved = task.clone();
    let mut placeholders = Vec::new();

    for value in resolved.params.values_mut() {
        resolve_value(value, results, &mut placeholders);
    }

    Resolution {
        task: resolved,
        placeholders,
    }
}

fn resolve_value(value: &mut Value, results: &ResultStore, placeholders: &mut Vec<Placeholder>) {
    match value {
        Value::String(text) => {
            if let Some(replaced) = resolve_text(text, results, placeholders) {
                *text = replaced;
            }
        }
        Value::Array(items) => {
            for item in items {
                resolve_value(item, results, placeholders);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                resolve_value(item, results, placeholders);
            }
        }
        _ => {}
    }
}

// None when the text holds no placeholder at all
fn resolve_text(
    text: &str,
    results: &ResultStore,
    placeholders: &mut Vec<Placeholder>,
) -> Option<String> {
    let regex = placeholder_regex();
    if !regex.is_match(text) {
        return None;
    }

    let replaced = regex.replace_all(text, |caps: &Captures| {
        let task_id = &caps[1];
        let (outcome, replacement) = match results.get(task_id) {
            None => (PlaceholderOutcome::Missing, caps[0].to_string()),
            Some(result) => match &result.output_data {
                None => (PlaceholderOutcome::NoOutput, caps[0].to_string()),
                Some(data) => (PlaceholderOutcome::Resolved, substitution_value(data)),
            },
        };
        placeholders.push(Placeholder {
            task_id: task_id.to_string(),
            outcome,
        });
        replacement
    });

    Some(replaced.into_owned())
}

/// The text inserted for a task's output.
///
/// A JSON object with a truthy `result` (or else `output`) field yields that
/// field: strings as-is, anything else as JSON text. All other data, including
/// text that is not JSON, is used verbatim.
pub fn substitution_value(output_data: &str) -> String {
    let parsed = match serde_json::from_str::<Value>(output_data) {
        Ok(Value::Object(map)) => map,
        _ => return output_data.to_string(),
    };

    let field = ["result", "output"]
        .iter()
        .filter_map(|key| parsed.get(*key))
        .find(|v| is_truthy(v));

    match field {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => output_data.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
