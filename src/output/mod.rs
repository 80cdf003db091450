// ABOUTME: Presentation layer for templates and runs
// ABOUTME: Formats text tables plus JSON and YAML views of the same data

pub mod error;
pub mod formatter;
pub mod text;

pub use error::{OutputError, Result};
pub use formatter::{Formatter, OutputFormat};
pub use text::strip_emojis;
