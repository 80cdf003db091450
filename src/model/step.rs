// ABOUTME: Step and Section data structures for templates and runs
// ABOUTME: Steps carry placeholder-bearing text; sections are editor-only grouping

use serde::{Deserialize, Serialize};

use super::id;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    /// Backend id of the execution record; present only on run steps
    /// that have been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_step_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_collapsed: bool,
}

impl Step {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id::new_step_id(),
            run_step_id: None,
            title: title.into(),
            description: description.into(),
            completed: false,
            section_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_section(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = Some(section_id.into());
        self
    }

    /// A fresh, unstarted copy for a new run. Sections are an editor
    /// concern and are not reproduced on run steps.
    pub fn instantiate(&self) -> Self {
        Self {
            id: self.id.clone(),
            run_step_id: None,
            title: self.title.clone(),
            description: self.description.clone(),
            completed: false,
            section_id: None,
        }
    }
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: id::new_section_id(),
            title: title.into(),
            is_collapsed: false,
        }
    }
}
