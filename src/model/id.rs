// ABOUTME: Local identifier generation for templates, steps, sections, and runs
// ABOUTME: Locally minted ids carry a prefix so sync can tell them from backend rows

use uuid::Uuid;

/// Prefix on step ids that were minted locally and not yet persisted.
/// The sync layer creates these with POST instead of PATCH.
pub const LOCAL_STEP_PREFIX: &str = "step_";

pub const LOCAL_SECTION_PREFIX: &str = "sec_";
pub const LOCAL_TEMPLATE_PREFIX: &str = "tpl_";
pub const LOCAL_RUN_PREFIX: &str = "run_";

pub fn new_step_id() -> String {
    format!("{}{}", LOCAL_STEP_PREFIX, Uuid::new_v4().simple())
}

pub fn new_section_id() -> String {
    format!("{}{}", LOCAL_SECTION_PREFIX, Uuid::new_v4().simple())
}

pub fn new_template_id() -> String {
    format!("{}{}", LOCAL_TEMPLATE_PREFIX, Uuid::new_v4().simple())
}

pub fn new_run_id() -> String {
    format!("{}{}", LOCAL_RUN_PREFIX, Uuid::new_v4().simple())
}

/// Check whether a step id was minted locally (never saved to the backend).
pub fn is_local_step_id(id: &str) -> bool {
    id.starts_with(LOCAL_STEP_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = new_step_id();
        let b = new_step_id();
        assert_ne!(a, b);
        assert!(a.starts_with(LOCAL_STEP_PREFIX));
    }

    #[test]
    fn test_local_step_id_detection() {
        assert!(is_local_step_id(&new_step_id()));
        assert!(!is_local_step_id("42"));
        assert!(!is_local_step_id(""));
    }
}
