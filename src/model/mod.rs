// ABOUTME: Model module for checklist templates and runs
// ABOUTME: Exports data structures, normalization, and validation

pub mod error;
pub mod id;
pub mod normalize;
pub mod run;
pub mod step;
pub mod template;
pub mod validate;
pub mod variable;

pub use error::{ModelError, ValidationError};
pub use run::Run;
pub use step::{Section, Step};
pub use template::{RecurrenceInterval, Template, DEFAULT_ICON};
pub use validate::{TemplateValidator, ValidationReport};
pub use variable::Variable;
