// ABOUTME: Error types for AI template generation
// ABOUTME: Covers transport failures, rejected requests, and unusable replies

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Generation failed with status {status}: {body}")]
    StatusError {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Generator returned no text")]
    EmptyResponse,

    #[error("Generator returned invalid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenerateError>;
