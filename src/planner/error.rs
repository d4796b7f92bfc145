// ABOUTME: Error types for the planning collaborator
// ABOUTME: Covers LLM transport failures, empty replies, and unusable plans

use thiserror::Error;

use crate::plan::PlanError;
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion request failed: {0}")]
    Completion(String),

    #[error("Completion returned no content")]
    EmptyResponse,

    #[error("Planner returned an unusable plan: {0}")]
    InvalidPlan(#[from] PlanError),

    #[error("Prompt rendering failed: {0}")]
    Template(#[from] TemplateError),

    #[error("Failed to serialize prompt context: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
