// ABOUTME: Error types for report and plan output
// ABOUTME: Covers serialization failures and writing to files

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlSerializationError(#[from] serde_yaml::Error),

    #[error("Write error: {message}")]
    WriteError { message: String },
}

pub type Result<T> = std::result::Result<T, OutputError>;
