// ABOUTME: Error types for template engine operations
// ABOUTME: Defines specific error types for prompt registration and rendering

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not registered: {0}")]
    UnknownTemplate(String),

    #[error("Template syntax error: {0}")]
    SyntaxError(#[from] handlebars::TemplateError),

    #[error("Handlebars error: {0}")]
    HandlebarsError(#[from] handlebars::RenderError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
