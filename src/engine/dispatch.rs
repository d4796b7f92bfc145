// ABOUTME: Sends one task to its worker and converts every outcome into an ExecutionResult
// ABOUTME: Unknown agents fail locally; transport errors and timeouts become fail results

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::result::{ExecutionResult, FailureKind};
use crate::agents::{AgentError, AgentRegistry, TaskRequest, TaskResponse};
use crate::plan::Task;

pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("{0}")]
    Transport(#[from] AgentError),

    #[error("Agent did not respond within {0:?}")]
    Timeout(Duration),
}

impl DispatchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DispatchError::UnknownAgent(_) => FailureKind::Routing,
            DispatchError::Transport(_) => FailureKind::Transport,
            DispatchError::Timeout(_) => FailureKind::Timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<AgentRegistry>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            registry,
            timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn has_agent(&self, agent: &str) -> bool {
        self.registry.contains(agent)
    }

    /// Perform at most one remote call for `task`
    #[instrument(skip(self, task), fields(task = %task.id, agent = %task.agent))]
    pub async fn dispatch(&self, task: &Task) -> ExecutionResult {
        match self.call(task).await {
            Ok(response) => {
                let result = ExecutionResult::from_response(&task.id, response);
                if !result.is_success() {
                    warn!(
                        "Task {} reported failure: {}",
                        task.id,
                        result.error_message.as_deref().unwrap_or_default()
                    );
                }
                result
            }
            Err(e) => {
                warn!("Dispatch of task {} failed: {}", task.id, e);
                ExecutionResult::failure(&task.id, e.kind(), e.to_string())
            }
        }
    }

    async fn call(&self, task: &Task) -> Result<TaskResponse, DispatchError> {
        let client = self
            .registry
            .get(&task.agent)
            .ok_or_else(|| DispatchError::UnknownAgent(task.agent.clone()))?;

        let request = build_request(task)?;
        debug!("Dispatching {} to {}", task.action, task.agent);

        match timeout(self.timeout, client.execute_task(request)).await {
            Ok(response) => Ok(response?),
            Err(_) => Err(DispatchError::Timeout(self.timeout)),
        }
    }
}

fn build_request(task: &Task) -> Result<TaskRequest, AgentError> {
    Ok(TaskRequest {
        id: task.id.clone(),
        task_type: task.action.clone(),
        payload: serde_json::to_vec(&task.params)?,
        metadata: task.metadata.clone(),
    })
}
