// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides a scripted LLM client, call-counting spy agents, and engine builders

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use harbinger::agents::{
    default_agents, AgentClient, AgentError, AgentRegistry, Catalogue, HealthStatus,
    Result as AgentResult, TaskRequest, TaskResponse,
};
use harbinger::engine::{Dispatcher, GraphExecutor, Recovery};
use harbinger::planner::{ChatMessage, CompletionClient, Planner, PlannerError, Result as PlannerResult};

/// LLM stand-in that returns queued replies in order and records every prompt
#[derive(Default)]
pub struct ScriptedCompletionClient {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletionClient {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn silent() -> Arc<Self> {
        Self::new(Vec::<String>::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// System prompt of the nth completion request
    pub fn system_prompt(&self, index: usize) -> String {
        self.calls.lock().unwrap()[index][0].content.clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> PlannerResult<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PlannerError::Completion("no scripted reply left".to_string()))
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Success(Option<String>),
    Fail(String),
    Transport(String),
}

/// Worker stand-in that replays scripted replies, then keeps returning the fallback
pub struct SpyAgent {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    requests: Mutex<Vec<TaskRequest>>,
}

impl SpyAgent {
    pub fn new() -> Arc<Self> {
        Self::scripted(Vec::new())
    }

    pub fn returning(data: &str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Reply::Success(Some(data.to_string())),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn scripted(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            fallback: Reply::Success(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<TaskRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Decoded params of the nth request
    pub fn params(&self, index: usize) -> Value {
        serde_json::from_slice(&self.requests.lock().unwrap()[index].payload).unwrap()
    }

    pub fn task_ids(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }
}

#[async_trait]
impl AgentClient for SpyAgent {
    async fn execute_task(&self, request: TaskRequest) -> AgentResult<TaskResponse> {
        let id = request.id.clone();
        self.requests.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            Reply::Success(data) => Ok(TaskResponse::success(id, data)),
            Reply::Fail(message) => Ok(TaskResponse::fail(id, message)),
            Reply::Transport(message) => Err(AgentError::Transport(message)),
        }
    }

    async fn health_check(&self) -> AgentResult<HealthStatus> {
        Ok(HealthStatus {
            status: "SERVING".to_string(),
            capabilities: Vec::new(),
        })
    }
}

pub fn registry(agents: &[(&str, Arc<SpyAgent>)]) -> AgentRegistry {
    agents
        .iter()
        .fold(AgentRegistry::new(), |registry, (name, agent)| {
            registry.with_agent(*name, agent.clone())
        })
}

pub fn planner(llm: Arc<ScriptedCompletionClient>) -> Arc<Planner> {
    Arc::new(Planner::new(llm, Catalogue::from_specs(&default_agents())).unwrap())
}

/// Executor with recovery backed by the scripted LLM
pub fn executor(agents: &[(&str, Arc<SpyAgent>)], llm: Arc<ScriptedCompletionClient>) -> GraphExecutor {
    let dispatcher = Dispatcher::new(Arc::new(registry(agents)));
    GraphExecutor::new(dispatcher).with_recovery(Recovery::new(planner(llm)))
}

/// JSON text of a fix plan as the LLM would return it
pub fn fix_plan_json(steps: &[(&str, &str, &str)]) -> String {
    let tasks: Vec<Value> = steps
        .iter()
        .map(|(id, agent, action)| {
            serde_json::json!({
                "id": id,
                "agent": agent,
                "action": action,
                "params": {},
                "depends_on": []
            })
        })
        .collect();
    serde_json::json!({"tasks": tasks, "folder_name": "error_resolution"}).to_string()
}
