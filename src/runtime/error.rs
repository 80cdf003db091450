// ABOUTME: Error types for run state transitions
// ABOUTME: Defines specific error types for runtime module operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Step not found: {step_id}")]
    StepNotFound { step_id: String },

    #[error("Variable not found: {key}")]
    VariableNotFound { key: String },
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
