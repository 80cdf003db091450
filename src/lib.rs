// ABOUTME: Main library module for the stride checklist runner
// ABOUTME: Exports all core modules and provides the public API

pub mod api;
pub mod cli;
pub mod generate;
pub mod model;
pub mod output;
pub mod render;
pub mod runtime;
pub mod store;

// Re-export commonly used types
pub use api::ApiClient;
pub use cli::{App, Args, Config};
pub use model::{Run, Step, Template, TemplateValidator, Variable};
pub use output::{Formatter, OutputFormat};
pub use runtime::RunStatus;
pub use store::Store;

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
