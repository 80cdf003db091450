// ABOUTME: AI-assisted template generation
// ABOUTME: Trait for pluggable generators plus the hosted-model implementation

pub mod error;
pub mod http;

pub use error::{GenerateError, Result};
pub use http::{HttpGenerator, TemplateGenerator, DEFAULT_GENERATOR_URL, DEFAULT_MODEL};
