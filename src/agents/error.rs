// ABOUTME: Error types for worker agent transport operations
// ABOUTME: Distinguishes connection failures, HTTP status failures, and malformed replies

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid agent endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Agent returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode agent response: {0}")]
    Decode(String),

    #[error("Failed to encode task payload: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
