// ABOUTME: Run data structure representing one live execution of a template
// ABOUTME: Owns independent step copies, live variables, and the step cursor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::step::Step;
use super::template::RecurrenceInterval;
use super::variable::Variable;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub template_id: String,
    pub template_name: String,
    #[serde(default)]
    pub current_step_index: usize,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub completed: bool,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_interval: Option<RecurrenceInterval>,
}

impl Run {
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current_step_index)
    }

    pub fn is_last_step(&self) -> bool {
        !self.steps.is_empty() && self.current_step_index == self.steps.len() - 1
    }

    /// One-based position for "Step N of M" displays.
    pub fn step_position(&self) -> (usize, usize) {
        (self.current_step_index + 1, self.steps.len())
    }

    pub fn progress_percent(&self) -> f64 {
        let len = self.steps.len().max(1);
        (self.current_step_index as f64 / len as f64) * 100.0
    }

    pub fn get_variable(&self, key: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.key == key)
    }

    pub fn get_variable_mut(&mut self, key: &str) -> Option<&mut Variable> {
        self.variables.iter_mut().find(|v| v.key == key)
    }

    /// Update a live variable value. Returns false when no variable
    /// with that key exists on the run.
    pub fn set_variable(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.get_variable_mut(key) {
            Some(variable) => {
                variable.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Declared variables still waiting for a value.
    pub fn unfilled_variables(&self) -> Vec<&Variable> {
        self.variables.iter().filter(|v| !v.is_filled()).collect()
    }

    /// Frozen recurrence settings, visible only while marked recurring.
    pub fn recurrence(&self) -> Option<RecurrenceInterval> {
        if self.is_recurring {
            Some(self.recurrence_interval.unwrap_or_default())
        } else {
            None
        }
    }

    /// Case-insensitive template-name match used by run list filtering.
    pub fn matches_search(&self, query: &str) -> bool {
        self.template_name
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}
