// ABOUTME: Substitution engine module for step text rendering
// ABOUTME: Provides token scanning, plain flattening, and rich HTML output

pub mod engine;
pub mod error;
pub mod rich;

pub use engine::{Node, Renderer};
pub use error::{RenderError, Result};
