// ABOUTME: Worker agent contract and the registry of agent clients
// ABOUTME: Every remote worker implements ExecuteTask and HealthCheck behind AgentClient

pub mod catalogue;
pub mod error;
pub mod health;
pub mod http;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub use catalogue::{default_agents, AgentSpec, Catalogue};
pub use error::{AgentError, Result};
pub use health::{HealthEntry, HealthState};
pub use http::HttpAgentClient;

/// One ExecuteTask call: `payload` is the JSON-serialized task params.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    pub id: String,
    pub task_type: String,
    pub payload: Vec<u8>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    #[serde(default)]
    pub id: String,
    pub status: ResponseStatus,
    #[serde(default)]
    pub result_uri: Option<String>,
    #[serde(default)]
    pub result_data: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl TaskResponse {
    pub fn success(id: impl Into<String>, result_data: Option<String>) -> Self {
        Self {
            id: id.into(),
            status: ResponseStatus::Success,
            result_uri: None,
            result_data,
            error_message: None,
        }
    }

    pub fn fail(id: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ResponseStatus::Fail,
            result_uri: None,
            result_data: None,
            error_message: Some(error_message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn execute_task(&self, request: TaskRequest) -> Result<TaskResponse>;

    async fn health_check(&self) -> Result<HealthStatus>;
}

/// Read-only mapping from agent name to client, built once at startup.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    clients: HashMap<String, Arc<dyn AgentClient>>,
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.agent_names())
            .finish()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP clients for every configured agent
    pub fn from_specs(specs: &IndexMap<String, AgentSpec>, request_timeout: Duration) -> Result<Self> {
        let mut registry = Self::new();
        for (name, spec) in specs {
            let client = HttpAgentClient::new(&spec.endpoint, request_timeout)?;
            registry.register(name.clone(), Arc::new(client));
        }
        Ok(registry)
    }

    pub fn register(&mut self, name: impl Into<String>, client: Arc<dyn AgentClient>) {
        self.clients.insert(name.into(), client);
    }

    pub fn with_agent(mut self, name: impl Into<String>, client: Arc<dyn AgentClient>) -> Self {
        self.register(name, client);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AgentClient>> {
        self.clients.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clients.contains_key(name)
    }

    pub fn agent_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
