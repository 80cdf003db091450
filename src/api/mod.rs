// ABOUTME: Backend REST adapter for templates and runs
// ABOUTME: Exposes the HTTP client plus the wire conversion layer

pub mod client;
pub mod error;
pub mod wire;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use wire::WireStatus;
