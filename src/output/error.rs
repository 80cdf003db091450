// ABOUTME: Error types for output handling operations
// ABOUTME: Defines specific error types for formatting templates and runs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlSerializationError(#[from] serde_yaml::Error),

    #[error("Render error: {0}")]
    RenderError(#[from] crate::render::RenderError),
}

pub type Result<T> = std::result::Result<T, OutputError>;
