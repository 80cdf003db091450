// ABOUTME: Error types for backend API communication
// ABOUTME: Wraps transport failures and non-success HTTP responses

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{context} failed with status {status}: {body}")]
    StatusError {
        context: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("JSON conversion failed: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;
