// ABOUTME: Runtime module driving run state
// ABOUTME: Handles instantiation, step advancement, status, and grouping

pub mod error;
pub mod instantiate;
pub mod progress;
pub mod status;

pub use error::{Result, RuntimeError};
pub use instantiate::start_run;
pub use progress::{complete_current_and_advance, set_step_completed, Advance};
pub use status::{derive_status, derive_status_at, latest_runs, RunStatus};
