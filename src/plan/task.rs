// ABOUTME: Task definition produced by the planner and consumed by the engine
// ABOUTME: Handles lenient deserialization of planner output (numeric ids, null fields)

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Task parameters: a mapping from name to an arbitrary JSON value.
pub type Params = Map<String, Value>;

/// Metadata key carrying the workspace directory for artifact-producing agents.
pub const OUTPUT_DIR_KEY: &str = "output_dir";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(alias = "agentName", alias = "agent_name")]
    pub agent: String,
    pub action: String,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub params: Params,
    #[serde(
        default,
        alias = "dependsOn",
        deserialize_with = "deserialize_ids",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub depends_on: Vec<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_metadata",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub metadata: HashMap<String, String>,
}

impl Task {
    pub fn new(id: impl Into<String>, agent: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agent: agent.into(),
            action: action.into(),
            params: Params::new(),
            depends_on: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_dependency(mut self, task_id: impl Into<String>) -> Self {
        self.depends_on.push(task_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn output_dir(&self) -> Option<&str> {
        self.metadata.get(OUTPUT_DIR_KEY).map(String::as_str)
    }

    pub fn set_output_dir(&mut self, output_dir: &str) {
        self.metadata
            .insert(OUTPUT_DIR_KEY.to_string(), output_dir.to_string());
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Integer(n) => n.to_string(),
            RawId::Float(f) => f.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = RawId::deserialize(deserializer)?.into_string();
    if id.trim().is_empty() {
        return Err(de::Error::custom("task id cannot be empty"));
    }
    Ok(id)
}

fn deserialize_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids: Option<Vec<RawId>> = Option::deserialize(deserializer)?;
    Ok(ids
        .unwrap_or_default()
        .into_iter()
        .map(RawId::into_string)
        .collect())
}

fn deserialize_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Planners occasionally emit non-string metadata values; keep them as text.
fn deserialize_metadata<'de, D>(
    deserializer: D,
) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Map<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| match value {
            Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect())
}
