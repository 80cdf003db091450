// ABOUTME: Conversions between domain types and backend wire records
// ABOUTME: Tolerant reads via the shared coercion helpers, typed payloads for writes

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::normalize::{coerce_bool, coerce_string, field, non_empty, variables_from_value};
use crate::model::{id, RecurrenceInterval, Run, Step, Template, Variable, DEFAULT_ICON};

/// Lifecycle states as the backend stores them, distinct from the
/// boolean completion flags carried on runs and steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireStatus {
    NotStarted,
    InProgress,
    Blocked,
    Done,
    Archived,
    #[serde(other)]
    Unknown,
}

impl WireStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "not_started" => Self::NotStarted,
            "in_progress" => Self::InProgress,
            "blocked" => Self::Blocked,
            "done" => Self::Done,
            "archived" => Self::Archived,
            _ => Self::Unknown,
        }
    }

    /// Both `done` and `archived` records count as finished work.
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Done | Self::Archived)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Archived => "archived",
            Self::Unknown => "unknown",
        }
    }
}

/// Builds a run from a backend record, taking the template details from
/// the record's embedded `template` object when one is present.
pub fn run_from_wire(value: &Value) -> Run {
    let template = value.get("template").cloned().unwrap_or(Value::Null);
    run_from_wire_with(value, &template)
}

/// Builds a run from a backend record with an explicit template record,
/// used when the caller already holds the template the run belongs to.
pub fn run_from_wire_with(value: &Value, template: &Value) -> Run {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);
    let template_obj = template.as_object().unwrap_or(&empty);

    let run_steps = obj.get("steps").and_then(Value::as_array);
    let template_steps = template_obj.get("steps").and_then(Value::as_array);
    let step_source: &[Value] = match run_steps {
        Some(steps) if !steps.is_empty() => steps,
        _ => template_steps.map(Vec::as_slice).unwrap_or(&[]),
    };
    let steps: Vec<Step> = step_source.iter().map(run_step_from_wire).collect();

    let current_step_index = coerce_index(obj.get("current_step_index"))
        .unwrap_or_else(|| derive_current_step_index(&steps));

    let status = WireStatus::from_wire(&coerce_string(obj.get("status")));
    let completed = coerce_bool(obj.get("completed")) || status.is_completed();

    let template_name = non_empty(coerce_string(obj.get("name")))
        .or_else(|| non_empty(coerce_string(obj.get("template_name"))))
        .or_else(|| non_empty(coerce_string(template_obj.get("name"))))
        .unwrap_or_default();
    let template_id = non_empty(coerce_string(obj.get("template_id")))
        .or_else(|| non_empty(coerce_string(template_obj.get("id"))))
        .unwrap_or_default();

    let is_recurring = coerce_bool(field(template_obj, &["isRecurring", "is_recurring"]));
    let recurrence_interval = if is_recurring {
        let raw = coerce_string(field(template_obj, &["recurrenceInterval", "recurrence_interval"]));
        Some(RecurrenceInterval::from_wire(&raw))
    } else {
        None
    };

    Run {
        id: non_empty(coerce_string(obj.get("id"))).unwrap_or_else(id::new_run_id),
        template_id,
        template_name,
        current_step_index,
        variables: variables_from_value(obj.get("variables")),
        steps,
        completed,
        started_at: parse_timestamp(obj.get("started_at"))
            .or_else(|| parse_timestamp(obj.get("created_at")))
            .unwrap_or_else(Utc::now),
        completed_at: parse_timestamp(obj.get("completed_at")),
        is_recurring,
        recurrence_interval,
    }
}

/// Maps a backend run-step record onto a step. Execution records nest
/// the originating template step under `template_step`; its fields win
/// over the flat ones when filled.
fn run_step_from_wire(value: &Value) -> Step {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);
    let template_step = obj
        .get("template_step")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    // Execution records carry a run_id; only those have a backend step
    // id that the complete-step endpoint accepts.
    let run_step_id = if obj.get("run_id").is_some_and(|v| !v.is_null()) {
        non_empty(coerce_string(obj.get("id")))
    } else {
        None
    };

    let status = WireStatus::from_wire(&coerce_string(obj.get("status")));

    Step {
        id: non_empty(coerce_string(obj.get("template_step_id")))
            .or_else(|| non_empty(coerce_string(obj.get("id"))))
            .unwrap_or_else(id::new_step_id),
        run_step_id,
        title: non_empty(coerce_string(template_step.get("title")))
            .unwrap_or_else(|| coerce_string(obj.get("title"))),
        description: non_empty(coerce_string(template_step.get("description")))
            .unwrap_or_else(|| coerce_string(obj.get("description"))),
        completed: status.is_completed() || coerce_bool(obj.get("completed")),
        section_id: None,
    }
}

/// Cursor position for a record that does not carry one: the first step
/// still open, or the last step when everything is already done.
pub fn derive_current_step_index(steps: &[Step]) -> usize {
    steps
        .iter()
        .position(|step| !step.completed)
        .unwrap_or(steps.len().saturating_sub(1))
}

fn coerce_index(value: Option<&Value>) -> Option<usize> {
    match value {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts RFC 3339 timestamps as well as the offset-less form some
/// backends emit; the latter is taken as UTC.
fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = coerce_string(value);
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Template metadata as the backend expects it on create and update.
/// Steps travel separately through the per-step endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateMetaPayload {
    pub name: String,
    pub description: String,
    pub icon: String,
    #[serde(rename = "isRecurring")]
    pub is_recurring: bool,
    /// Serialized as an explicit null for non-recurring templates.
    #[serde(rename = "recurrenceInterval")]
    pub recurrence_interval: Option<RecurrenceInterval>,
    pub variables: Vec<Variable>,
}

impl TemplateMetaPayload {
    pub fn from_template(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
            description: template.description.clone(),
            icon: if template.icon.is_empty() {
                DEFAULT_ICON.to_string()
            } else {
                template.icon.clone()
            },
            is_recurring: template.is_recurring,
            recurrence_interval: template.recurrence(),
            variables: template.default_variables.clone(),
        }
    }
}

/// A single template step for the step endpoints. Positions are 1-based
/// on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct StepPayload {
    pub title: String,
    pub description: String,
    pub is_required: bool,
    pub order_index: usize,
}

impl StepPayload {
    pub fn from_step(step: &Step, position: usize) -> Self {
        Self {
            title: step.title.clone(),
            description: step.description.clone(),
            is_required: true,
            order_index: position + 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunCreatePayload {
    pub name: String,
    pub variables: Vec<Variable>,
}

/// Full run state for updates. `completed_at` stays in the payload as
/// null while the run is open so the backend clears any stale value.
#[derive(Debug, Clone, Serialize)]
pub struct RunUpdatePayload {
    pub name: String,
    pub variables: Vec<Variable>,
    pub current_step_index: usize,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub status: WireStatus,
}

impl RunUpdatePayload {
    pub fn from_run(run: &Run) -> Self {
        Self {
            name: run.template_name.clone(),
            variables: run.variables.clone(),
            current_step_index: run.current_step_index,
            completed: run.completed,
            completed_at: run.completed_at.map(|at| at.to_rfc3339()),
            status: if run.completed {
                WireStatus::Done
            } else {
                WireStatus::InProgress
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepStatusPayload {
    pub status: WireStatus,
}

impl StepStatusPayload {
    pub fn done() -> Self {
        Self {
            status: WireStatus::Done,
        }
    }
}
