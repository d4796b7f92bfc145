// ABOUTME: Fleet-wide health checks across all registered agents
// ABOUTME: Probes every agent concurrently with a per-agent deadline

use futures::future::join_all;
use serde::Serialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::AgentRegistry;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum HealthState {
    Up { capabilities: Vec<String> },
    Error { message: String },
    Down { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthEntry {
    pub agent: String,
    #[serde(flatten)]
    pub state: HealthState,
}

impl HealthEntry {
    pub fn is_up(&self) -> bool {
        matches!(self.state, HealthState::Up { .. })
    }
}

impl AgentRegistry {
    /// Check every registered agent, sorted by agent name
    pub async fn health_report(&self, deadline: Duration) -> Vec<HealthEntry> {
        let checks = self.agent_names().into_iter().filter_map(|name| {
            let client = self.get(&name)?;
            Some(async move {
                debug!("Checking health of agent {}", name);
                let state = match timeout(deadline, client.health_check()).await {
                    Ok(Ok(status)) => HealthState::Up {
                        capabilities: status.capabilities,
                    },
                    Ok(Err(e)) => {
                        warn!("Agent {} health check failed: {}", name, e);
                        HealthState::Error {
                            message: e.to_string(),
                        }
                    }
                    Err(_) => {
                        warn!("Agent {} did not answer within {:?}", name, deadline);
                        HealthState::Down {
                            message: format!("no response within {:?}", deadline),
                        }
                    }
                };
                HealthEntry { agent: name, state }
            })
        });

        join_all(checks).await
    }
}
