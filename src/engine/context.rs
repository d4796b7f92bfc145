// ABOUTME: Shared result store for one plan execution and its fix plans
// ABOUTME: Keeps the latest result per task id in first-execution order

use indexmap::IndexMap;
use serde_json::Value;

use super::result::ExecutionResult;

/// Results keyed by task id. Owned by a single plan run and passed down
/// `&mut` into any fix plan, so fix steps can read the outputs they repair.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: IndexMap<String, ExecutionResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, replacing any earlier attempt for the same task
    pub fn record(&mut self, result: ExecutionResult) {
        self.results.insert(result.task_id.clone(), result);
    }

    pub fn get(&self, task_id: &str) -> Option<&ExecutionResult> {
        self.results.get(task_id)
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.results.contains_key(task_id)
    }

    pub fn succeeded(&self, task_id: &str) -> bool {
        self.get(task_id).is_some_and(ExecutionResult::is_success)
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.values()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// JSON object of task id to result, as shown to the recovery planner
    pub fn to_context(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.results)
    }

    pub fn into_results(self) -> Vec<ExecutionResult> {
        self.results.into_values().collect()
    }
}
