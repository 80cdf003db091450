// ABOUTME: Step-advance state machine for runs
// ABOUTME: The cursor only moves forward; finishing stamps the completion time

use chrono::{DateTime, Utc};
use tracing::debug;

use super::error::{Result, RuntimeError};
use crate::model::Run;

/// Outcome of completing the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to the next step.
    Advanced { next_index: usize },
    /// The final step was completed; the run is now finished.
    Finished,
    /// The run was already finished; nothing changed.
    AlreadyCompleted,
}

/// Mark the current step completed and advance the cursor. On the final
/// step the cursor stays put and the run is marked completed with a
/// completion timestamp. Calling this on a finished run is a no-op.
pub fn complete_current_and_advance(run: &mut Run, now: DateTime<Utc>) -> Advance {
    if run.completed {
        return Advance::AlreadyCompleted;
    }

    if run.steps.is_empty() {
        run.completed = true;
        run.completed_at = Some(now);
        return Advance::Finished;
    }

    let index = run.current_step_index.min(run.steps.len() - 1);
    run.steps[index].completed = true;

    if index + 1 < run.steps.len() {
        run.current_step_index = index + 1;
        debug!(run_id = %run.id, step = index + 1, "advanced to next step");
        Advance::Advanced {
            next_index: index + 1,
        }
    } else {
        run.current_step_index = index;
        run.completed = true;
        run.completed_at = Some(now);
        debug!(run_id = %run.id, "run finished");
        Advance::Finished
    }
}

/// Set the completed flag on an arbitrary step without touching the
/// cursor. This is the administrative edit, not normal progression.
pub fn set_step_completed(run: &mut Run, step_id: &str, completed: bool) -> Result<()> {
    match run.steps.iter_mut().find(|s| s.id == step_id) {
        Some(step) => {
            step.completed = completed;
            Ok(())
        }
        None => Err(RuntimeError::StepNotFound {
            step_id: step_id.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Step, Template, Variable};
    use crate::runtime::instantiate::start_run;

    fn three_step_run() -> Run {
        let mut template = Template::new("Checklist");
        template.steps = vec![
            Step::new("One", "").with_id("1"),
            Step::new("Two", "").with_id("2"),
            Step::new("Three", "").with_id("3"),
        ];
        start_run(&template, &[], Utc::now())
    }

    #[test]
    fn test_advance_walks_forward_monotonically() {
        let mut run = three_step_run();

        assert_eq!(
            complete_current_and_advance(&mut run, Utc::now()),
            Advance::Advanced { next_index: 1 }
        );
        assert!(run.steps[0].completed);
        assert!(!run.completed);

        assert_eq!(
            complete_current_and_advance(&mut run, Utc::now()),
            Advance::Advanced { next_index: 2 }
        );

        let finish = Utc::now();
        assert_eq!(complete_current_and_advance(&mut run, finish), Advance::Finished);
        assert!(run.completed);
        assert_eq!(run.completed_at, Some(finish));
        assert_eq!(run.current_step_index, 2);
        assert!(run.steps.iter().all(|s| s.completed));
    }

    #[test]
    fn test_advance_on_finished_run_is_noop() {
        let mut run = three_step_run();
        for _ in 0..3 {
            complete_current_and_advance(&mut run, Utc::now());
        }
        let before = run.clone();

        assert_eq!(
            complete_current_and_advance(&mut run, Utc::now()),
            Advance::AlreadyCompleted
        );
        assert_eq!(run, before);
    }

    #[test]
    fn test_advance_on_empty_run_finishes() {
        let template = Template::new("Empty");
        let mut run = start_run(&template, &[], Utc::now());

        assert_eq!(
            complete_current_and_advance(&mut run, Utc::now()),
            Advance::Finished
        );
        assert!(run.completed);
    }

    #[test]
    fn test_set_step_completed_by_id() {
        let mut run = three_step_run();

        set_step_completed(&mut run, "2", true).unwrap();
        assert!(run.steps[1].completed);
        assert_eq!(run.current_step_index, 0);

        set_step_completed(&mut run, "2", false).unwrap();
        assert!(!run.steps[1].completed);

        let result = set_step_completed(&mut run, "99", true);
        assert!(matches!(
            result,
            Err(RuntimeError::StepNotFound { .. })
        ));
    }

    #[test]
    fn test_variables_survive_advancing() {
        let mut template = Template::new("With vars");
        template.default_variables = vec![Variable::new("x", "X")];
        template.steps = vec![Step::new("Only", "Use {{x}}")];
        let mut run = start_run(
            &template,
            &[Variable::new("x", "X").with_value("42")],
            Utc::now(),
        );

        complete_current_and_advance(&mut run, Utc::now());
        assert_eq!(run.get_variable("x").unwrap().value, "42");
    }
}
