// ABOUTME: Error types for the template and run store
// ABOUTME: Wraps lookup failures plus the api, model, and runtime layers

use thiserror::Error;

use crate::api::ApiError;
use crate::model::ModelError;
use crate::runtime::RuntimeError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Run id prefix matches more than one run: {0}")]
    AmbiguousRun(String),

    #[error("API error: {0}")]
    ApiError(#[from] ApiError),

    #[error("Model error: {0}")]
    ModelError(#[from] ModelError),

    #[error("Runtime error: {0}")]
    RuntimeError(#[from] RuntimeError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
