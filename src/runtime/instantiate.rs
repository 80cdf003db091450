// ABOUTME: Run instantiation from a template snapshot
// ABOUTME: Produces fully independent step and variable copies

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::{id, Run, Template, Variable};

/// Instantiate a run from a template. Each declared variable is seeded
/// from the matching entry in `initial_variables` (by key), falling
/// back to the template's default value. Entries for keys the template
/// does not declare are appended as ad-hoc variables.
///
/// The run owns full copies of steps and variables; later mutation of
/// either side never affects the other.
pub fn start_run(template: &Template, initial_variables: &[Variable], now: DateTime<Utc>) -> Run {
    let mut variables: Vec<Variable> = template
        .default_variables
        .iter()
        .map(|declared| {
            let value = initial_variables
                .iter()
                .find(|v| v.key == declared.key)
                .map(|v| v.value.clone())
                .unwrap_or_else(|| declared.value.clone());
            Variable {
                key: declared.key.clone(),
                label: declared.label.clone(),
                value,
                description: declared.description.clone(),
            }
        })
        .collect();

    for extra in initial_variables {
        if template.get_variable(&extra.key).is_none() {
            variables.push(extra.clone());
        }
    }

    let run = Run {
        id: id::new_run_id(),
        template_id: template.id.clone(),
        template_name: template.name.clone(),
        current_step_index: 0,
        variables,
        steps: template.steps.iter().map(|s| s.instantiate()).collect(),
        completed: false,
        started_at: now,
        completed_at: None,
        is_recurring: template.is_recurring,
        recurrence_interval: template.recurrence_interval,
    };

    debug!(
        run_id = %run.id,
        template_id = %run.template_id,
        steps = run.steps.len(),
        "instantiated run"
    );

    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;

    fn webinar_template() -> Template {
        let mut template = Template::new("Host a Webinar");
        template.default_variables = vec![
            Variable::new("topic", "Topic"),
            Variable::new("host", "Host").with_value("events team"),
        ];
        template.steps = vec![
            Step::new("Announce", "Announce {{topic}} hosted by {{host}}").with_id("1"),
            Step::new("Go live", "Start the stream").with_id("2"),
        ];
        template
    }

    #[test]
    fn test_start_run_seeds_variables() {
        let template = webinar_template();
        let overrides = [Variable::new("topic", "Topic").with_value("Rust 101")];

        let run = start_run(&template, &overrides, Utc::now());

        assert_eq!(run.template_id, template.id);
        assert_eq!(run.template_name, "Host a Webinar");
        assert_eq!(run.current_step_index, 0);
        assert!(!run.completed);
        assert_eq!(run.get_variable("topic").unwrap().value, "Rust 101");
        // Unoverridden variables keep the template default.
        assert_eq!(run.get_variable("host").unwrap().value, "events team");
    }

    #[test]
    fn test_start_run_appends_undeclared_overrides() {
        let template = webinar_template();
        let overrides = [Variable::new("room", "room").with_value("B12")];

        let run = start_run(&template, &overrides, Utc::now());

        assert_eq!(run.variables.len(), 3);
        assert_eq!(run.get_variable("room").unwrap().value, "B12");
    }

    #[test]
    fn test_start_run_copies_steps_unstarted() {
        let mut template = webinar_template();
        template.steps[0].completed = true;

        let run = start_run(&template, &[], Utc::now());

        assert_eq!(run.steps.len(), 2);
        assert!(run.steps.iter().all(|s| !s.completed));
        assert!(run.steps.iter().all(|s| s.run_step_id.is_none()));
    }

    #[test]
    fn test_start_run_freezes_recurrence() {
        let mut template = webinar_template();
        template.set_recurrence(Some(crate::model::RecurrenceInterval::Weekly));

        let run = start_run(&template, &[], Utc::now());

        assert!(run.is_recurring);
        assert_eq!(
            run.recurrence(),
            Some(crate::model::RecurrenceInterval::Weekly)
        );
    }

    #[test]
    fn test_run_and_template_are_independent() {
        let mut template = webinar_template();
        let mut run = start_run(&template, &[], Utc::now());

        run.steps[0].title = "Changed in run".to_string();
        run.set_variable("host", "someone else");
        template.steps[1].title = "Changed in template".to_string();

        assert_eq!(template.steps[0].title, "Announce");
        assert_eq!(template.get_variable("host").unwrap().value, "events team");
        assert_eq!(run.steps[1].title, "Go live");
    }
}
