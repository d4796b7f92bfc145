// ABOUTME: Planning collaborator: turns free text or a failure report into a Plan
// ABOUTME: Owns the prompt templates and parses LLM replies through Plan::from_json

pub mod error;
pub mod openai;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::agents::Catalogue;
use crate::plan::{Plan, Task};
use crate::template::TemplateEngine;

pub use error::{PlannerError, Result};
pub use openai::OpenAiClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One chat completion round trip with an LLM
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Everything the recovery prompt needs to know about a failure
#[derive(Debug, Clone)]
pub struct FixRequest<'a> {
    pub failed_task: &'a Task,
    pub error: &'a str,
    /// Results gathered so far, keyed by task id
    pub context: Value,
}

#[derive(Clone)]
pub struct Planner {
    client: Arc<dyn CompletionClient>,
    templates: TemplateEngine,
    catalogue: Catalogue,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("catalogue", &self.catalogue.entries().len())
            .finish()
    }
}

impl Planner {
    pub fn new(client: Arc<dyn CompletionClient>, catalogue: Catalogue) -> Result<Self> {
        let mut templates = TemplateEngine::new();
        templates.register(prompts::PLANNER_TEMPLATE, prompts::PLANNER_PROMPT)?;
        templates.register(prompts::RECOVERY_TEMPLATE, prompts::RECOVERY_PROMPT)?;

        Ok(Self {
            client,
            templates,
            catalogue,
        })
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Render the planner system prompt for the current catalogue
    pub fn planner_prompt(&self) -> Result<String> {
        let data = json!({
            "catalogue": self.catalogue.render(),
            "example_plan": prompts::EXAMPLE_PLAN,
            "placeholder": prompts::PLACEHOLDER_SYNTAX,
        });
        Ok(self.templates.render(prompts::PLANNER_TEMPLATE, &data)?)
    }

    /// Render the recovery prompt for a failed task
    pub fn recovery_prompt(&self, request: &FixRequest<'_>) -> Result<String> {
        let data = json!({
            "failed_task": serde_json::to_value(request.failed_task)?,
            "error": request.error,
            "context": request.context,
            "catalogue": self.catalogue.render(),
            "placeholder": prompts::PLACEHOLDER_SYNTAX,
        });
        Ok(self.templates.render(prompts::RECOVERY_TEMPLATE, &data)?)
    }

    /// Generate a plan for a natural-language request
    #[instrument(skip(self))]
    pub async fn plan(&self, input: &str) -> Result<Plan> {
        let messages = vec![
            ChatMessage::system(self.planner_prompt()?),
            ChatMessage::user(input),
        ];

        let reply = self.client.complete(&messages).await?;
        debug!("Planner reply: {}", reply);

        let plan = Plan::from_json(&reply)?;
        info!("Planned {} task(s) for '{}'", plan.len(), plan.label);
        Ok(plan)
    }

    /// Ask for a plan that repairs the cause of a failed task
    #[instrument(skip(self, request), fields(task = %request.failed_task.id))]
    pub async fn fix_plan(&self, request: &FixRequest<'_>) -> Result<Plan> {
        let messages = vec![
            ChatMessage::system(self.recovery_prompt(request)?),
            ChatMessage::user(format!(
                "Generate a fix plan for task {}",
                request.failed_task.id
            )),
        ];

        let reply = self.client.complete(&messages).await?;
        debug!("Recovery reply: {}", reply);

        let plan = Plan::from_json(&reply)?;
        info!("Fix plan has {} step(s)", plan.len());
        Ok(plan)
    }
}
