// ABOUTME: Run status derivation and recurring-run grouping
// ABOUTME: Status priority is completed, then overdue, then running, then idle

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::Run;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Idle,
    Overdue,
    Completed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Idle => "idle",
            RunStatus::Overdue => "overdue",
            RunStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the display status of a run as of now.
pub fn derive_status(run: &Run) -> RunStatus {
    derive_status_at(run, Utc::now())
}

/// Derive the display status of a run at a given instant.
///
/// A finished run is always completed, regardless of recurrence. An
/// unfinished recurring run is overdue once strictly more than the
/// interval has elapsed since its last activity (completion time when
/// present, otherwise start time); exactly the interval is not overdue.
/// Otherwise a run counts as running while it is less than a day old
/// or has made any progress.
pub fn derive_status_at(run: &Run, now: DateTime<Utc>) -> RunStatus {
    if run.completed {
        return RunStatus::Completed;
    }

    if let Some(interval) = run.recurrence() {
        let last_activity = run.completed_at.unwrap_or(run.started_at);
        let days_since_activity = (now - last_activity).num_days();
        if days_since_activity > interval.interval_days() {
            return RunStatus::Overdue;
        }
    }

    let days_since_start = (now - run.started_at).num_days();
    if days_since_start < 1 || run.current_step_index > 0 {
        return RunStatus::Running;
    }

    RunStatus::Idle
}

/// Collapse recurring runs so each recurring template is represented
/// only by its latest run (by start time; on a tie the first seen
/// wins). Recurring entries come first in first-seen template order,
/// followed by non-recurring runs in input order.
pub fn latest_runs(runs: &[Run]) -> Vec<&Run> {
    let mut grouped: IndexMap<&str, &Run> = IndexMap::new();
    let mut non_recurring = Vec::new();

    for run in runs {
        if run.is_recurring {
            match grouped.get_mut(run.template_id.as_str()) {
                Some(existing) => {
                    if run.started_at > existing.started_at {
                        *existing = run;
                    }
                }
                None => {
                    grouped.insert(run.template_id.as_str(), run);
                }
            }
        } else {
            non_recurring.push(run);
        }
    }

    grouped.into_values().chain(non_recurring).collect()
}
