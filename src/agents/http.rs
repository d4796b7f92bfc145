// ABOUTME: HTTP transport for the worker agent contract
// ABOUTME: Sends ExecuteTask as JSON POST /execute and HealthCheck as GET /health

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::error::{AgentError, Result};
use super::{AgentClient, HealthStatus, TaskRequest, TaskResponse};

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Serialize)]
struct ExecuteTaskBody<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    task_type: &'a str,
    payload: String,
    metadata: &'a HashMap<String, String>,
}

pub struct HttpAgentClient {
    base_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpAgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAgentClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl HttpAgentClient {
    pub fn new(endpoint: &str, request_timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(endpoint).map_err(|e| AgentError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AgentError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "endpoint must be a base URL".to_string(),
            });
        }
        // Url::join replaces the last path segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AgentError::InvalidEndpoint {
                endpoint: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AgentError::Status {
                status: status.as_u16(),
                body: preview_body(&body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn execute_task(&self, request: TaskRequest) -> Result<TaskResponse> {
        let url = self.endpoint("execute")?;
        let body = ExecuteTaskBody {
            id: &request.id,
            task_type: &request.task_type,
            payload: BASE64.encode(&request.payload),
            metadata: &request.metadata,
        };

        debug!("POST {} (task {})", url, request.id);

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Transport(describe_error(&e)))?;
        let text = Self::read_body(response).await?;

        serde_json::from_str(&text)
            .map_err(|e| AgentError::Decode(format!("{} (body: {})", e, preview_body(&text))))
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        let url = self.endpoint("health")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AgentError::Transport(describe_error(&e)))?;
        let text = Self::read_body(response).await?;

        serde_json::from_str(&text)
            .map_err(|e| AgentError::Decode(format!("{} (body: {})", e, preview_body(&text))))
    }
}

// reqwest's Display hides the root cause ("connection refused") in the source chain
fn describe_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    if trimmed.len() <= BODY_PREVIEW_LIMIT {
        return trimmed.to_string();
    }
    let mut end = BODY_PREVIEW_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
