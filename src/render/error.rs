// ABOUTME: Error types for the substitution engine
// ABOUTME: Rendering itself is total; only pattern compilation can fail

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to compile placeholder pattern: {0}")]
    PatternError(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
