// ABOUTME: Error types for template model parsing and validation
// ABOUTME: Defines specific error types for model module operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read template file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse template document: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse template JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Template name cannot be empty")]
    EmptyName,

    #[error("Variable at position {index} has an empty key")]
    EmptyVariableKey { index: usize },

    #[error("Duplicate variable key: {key}")]
    DuplicateVariableKey { key: String },

    #[error("Duplicate step id: {id}")]
    DuplicateStepId { id: String },

    #[error("Empty template: no steps defined")]
    EmptyTemplate,

    #[error("Unbalanced placeholder braces in step '{step}'")]
    UnbalancedBraces { step: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
