// ABOUTME: Formats templates and runs for terminal, JSON, and YAML output
// ABOUTME: Text views render the current step with live variable values filled in

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Run, Template, ValidationReport, Variable};
use crate::render::Renderer;
use crate::runtime::derive_status_at;

use super::error::Result;
use super::text::{display_name, short_id, status_badge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Renders domain objects in the selected format. Structured formats
/// serialize the objects as-is, with the derived run status attached.
pub struct Formatter {
    format: OutputFormat,
    renderer: Renderer,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Result<Self> {
        Ok(Self {
            format,
            renderer: Renderer::new()?,
        })
    }

    pub fn format_template_list(&self, templates: &[Template]) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(template_table(templates)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(templates)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(templates)?),
        }
    }

    pub fn format_template(&self, template: &Template) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(template_text(template)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(template)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(template)?),
        }
    }

    pub fn format_run_list(&self, runs: &[&Run], now: DateTime<Utc>) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(run_table(runs, now)),
            OutputFormat::Json => {
                let values = self.run_values(runs, now)?;
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Yaml => {
                let values = self.run_values(runs, now)?;
                Ok(serde_yaml::to_string(&values)?)
            }
        }
    }

    pub fn format_run(&self, run: &Run, now: DateTime<Utc>) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.run_text(run, now)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&self.run_value(run, now)?)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&self.run_value(run, now)?)?),
        }
    }

    /// Shows every step of a template with the given variables applied,
    /// without creating anything.
    pub fn format_preview(&self, template: &Template, variables: &[Variable]) -> Result<String> {
        match self.format {
            OutputFormat::Json | OutputFormat::Yaml => self.format_template(template),
            OutputFormat::Text => {
                let mut output = String::new();
                output.push_str(&format!("Preview: {} {}\n", template.icon, template.name));

                if !variables.is_empty() {
                    output.push_str("\nVariables:\n");
                    push_variables(&mut output, variables);
                }

                output.push_str("\nSteps:\n");
                for (position, step) in template.steps.iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", position + 1, step.title));
                    let rendered = self.renderer.render_to_string(&step.description, variables);
                    if !rendered.is_empty() {
                        output.push_str(&format!("     {}\n", rendered.replace('\n', "\n     ")));
                    }
                }
                Ok(output)
            }
        }
    }

    pub fn format_report(report: &ValidationReport) -> String {
        let mut output = String::new();
        for error in &report.errors {
            output.push_str(&format!("error: {}\n", error));
        }
        for warning in &report.warnings {
            output.push_str(&format!("warning: {}\n", warning));
        }
        output
    }

    fn run_text(&self, run: &Run, now: DateTime<Utc>) -> String {
        let status = derive_status_at(run, now);
        let (position, total) = run.step_position();
        let mut output = String::new();

        output.push_str(&format!("{}\n", run.template_name));
        output.push_str(&format!("Run: {}\n", run.id));
        output.push_str(&format!("Status: {}\n", status));
        output.push_str(&format!(
            "Started: {}\n",
            run.started_at.format("%Y-%m-%d %H:%M UTC")
        ));
        if let Some(completed_at) = run.completed_at {
            output.push_str(&format!(
                "Completed: {}\n",
                completed_at.format("%Y-%m-%d %H:%M UTC")
            ));
        }
        if let Some(interval) = run.recurrence() {
            output.push_str(&format!("Recurs: {}\n", interval));
        }
        if total > 0 && !run.completed {
            output.push_str(&format!(
                "Progress: Step {} of {} ({:.0}%)\n",
                position,
                total,
                run.progress_percent()
            ));
        }

        if !run.variables.is_empty() {
            output.push_str("\nVariables:\n");
            push_variables(&mut output, &run.variables);
        }

        if !run.completed {
            if let Some(step) = run.current_step() {
                output.push_str(&format!("\nCurrent step: {}\n", step.title));
                let rendered = self.renderer.render_to_string(&step.description, &run.variables);
                if !rendered.is_empty() {
                    output.push_str(&format!("  {}\n", rendered.replace('\n', "\n  ")));
                }
            }
        }

        if !run.steps.is_empty() {
            output.push_str("\nSteps:\n");
            for (index, step) in run.steps.iter().enumerate() {
                let marker = if step.completed {
                    "✓"
                } else if index == run.current_step_index && !run.completed {
                    ">"
                } else {
                    " "
                };
                output.push_str(&format!("  {} {}. {}\n", marker, index + 1, step.title));
            }
        }
        output
    }

    fn run_values(&self, runs: &[&Run], now: DateTime<Utc>) -> Result<Vec<Value>> {
        runs.iter().map(|run| self.run_value(run, now)).collect()
    }

    fn run_value(&self, run: &Run, now: DateTime<Utc>) -> Result<Value> {
        let mut value = serde_json::to_value(run)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "status".to_string(),
                Value::String(derive_status_at(run, now).as_str().to_string()),
            );
        }
        Ok(value)
    }
}

fn push_variables(output: &mut String, variables: &[Variable]) {
    for variable in variables {
        if variable.is_filled() {
            output.push_str(&format!("  {} = {}\n", variable.key, variable.value));
        } else {
            output.push_str(&format!("  {} (unfilled)\n", variable.key));
        }
    }
}

fn template_table(templates: &[Template]) -> String {
    if templates.is_empty() {
        return "No templates found.\n".to_string();
    }
    let mut output = String::new();
    output.push_str(&format!(
        "{:<32} {:<14} {:>5} {:>9}  {}\n",
        "Name", "Id", "Steps", "Variables", "Recurrence"
    ));
    for template in templates {
        let recurrence = template
            .recurrence()
            .map(|interval| interval.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{:<32} {:<14} {:>5} {:>9}  {}\n",
            format!("{} {}", template.icon, display_name(&template.name)),
            short_id(&template.id),
            template.steps.len(),
            template.default_variables.len(),
            recurrence
        ));
    }
    output
}

fn template_text(template: &Template) -> String {
    let mut output = String::new();
    output.push_str(&format!("{} {}\n", template.icon, template.name));
    if !template.description.is_empty() {
        output.push_str(&format!("{}\n", template.description));
    }
    output.push_str(&format!("Id: {}\n", template.id));
    if let Some(interval) = template.recurrence() {
        output.push_str(&format!("Recurs: {}\n", interval));
    }

    if !template.default_variables.is_empty() {
        output.push_str("\nVariables:\n");
        for variable in &template.default_variables {
            let value = if variable.value.is_empty() {
                String::new()
            } else {
                format!(" = {}", variable.value)
            };
            output.push_str(&format!(
                "  {} ({}){}\n",
                variable.key, variable.label, value
            ));
        }
    }

    output.push_str("\nSteps:\n");
    for (position, step) in template.steps.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", position + 1, step.title));
        if !step.description.is_empty() {
            output.push_str(&format!(
                "     {}\n",
                step.description.replace('\n', "\n     ")
            ));
        }
    }
    output
}

fn run_table(runs: &[&Run], now: DateTime<Utc>) -> String {
    if runs.is_empty() {
        return "No runs found.\n".to_string();
    }
    let mut output = String::new();
    output.push_str(&format!(
        "{:<13} {:<30} {:<14} {:>6}  {}\n",
        "Status", "Run", "Id", "Step", "Started"
    ));
    for run in runs {
        let status = derive_status_at(run, now);
        let (position, total) = run.step_position();
        output.push_str(&format!(
            "{:<13} {:<30} {:<14} {:>6}  {}\n",
            status_badge(status),
            display_name(&run.template_name),
            short_id(&run.id),
            format!("{}/{}", position, total),
            run.started_at.format("%Y-%m-%d")
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;
    use crate::runtime::start_run;

    fn sample_template() -> Template {
        let mut template = Template::new("Sprint Review");
        template.description = "Weekly sprint review".to_string();
        template.default_variables = vec![
            Variable::new("team", "Team").with_value("Platform"),
            Variable::new("sprint", "Sprint"),
        ];
        template.steps = vec![
            Step::new("Collect metrics", "Gather velocity from the {{team}} board"),
            Step::new("Send recap", "Mail {{missing}} notes"),
        ];
        template
    }

    #[test]
    fn test_template_table_lists_names_and_counts() {
        let formatter = Formatter::new(OutputFormat::Text).unwrap();
        let output = formatter
            .format_template_list(&[sample_template()])
            .unwrap();
        assert!(output.contains("Sprint Review"));
        assert!(output.contains("Recurrence"));
        // Non-recurring templates show a dash.
        assert!(output.contains(" -"));
    }

    #[test]
    fn test_template_list_empty_message() {
        let formatter = Formatter::new(OutputFormat::Text).unwrap();
        let output = formatter.format_template_list(&[]).unwrap();
        assert_eq!(output, "No templates found.\n");
    }

    #[test]
    fn test_run_text_renders_current_step_with_values() {
        let formatter = Formatter::new(OutputFormat::Text).unwrap();
        let run = start_run(&sample_template(), &[], Utc::now());
        let output = formatter.format_run(&run, Utc::now()).unwrap();

        assert!(output.contains("Status: running"));
        assert!(output.contains("Progress: Step 1 of 2 (0%)"));
        assert!(output.contains("Gather velocity from the Platform board"));
        // Declared but unfilled variables are flagged.
        assert!(output.contains("sprint (unfilled)"));
        assert!(output.contains("> 1. Collect metrics"));
    }

    #[test]
    fn test_run_text_leaves_unknown_tokens_untouched() {
        let formatter = Formatter::new(OutputFormat::Text).unwrap();
        let mut run = start_run(&sample_template(), &[], Utc::now());
        run.current_step_index = 1;
        let output = formatter.format_run(&run, Utc::now()).unwrap();
        assert!(output.contains("Mail {{missing}} notes"));
    }

    #[test]
    fn test_run_json_includes_derived_status() {
        let formatter = Formatter::new(OutputFormat::Json).unwrap();
        let run = start_run(&sample_template(), &[], Utc::now());
        let output = formatter.format_run(&run, Utc::now()).unwrap();

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "running");
        assert_eq!(value["templateName"], "Sprint Review");
    }

    #[test]
    fn test_run_list_yaml_parses_back() {
        let formatter = Formatter::new(OutputFormat::Yaml).unwrap();
        let run = start_run(&sample_template(), &[], Utc::now());
        let output = formatter.format_run_list(&[&run], Utc::now()).unwrap();

        let parsed: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed[0]["status"], serde_yaml::Value::from("running"));
    }

    #[test]
    fn test_preview_substitutes_overrides() {
        let formatter = Formatter::new(OutputFormat::Text).unwrap();
        let template = sample_template();
        let variables = vec![Variable::new("team", "Team").with_value("Search")];
        let output = formatter.format_preview(&template, &variables).unwrap();

        assert!(output.contains("Preview:"));
        assert!(output.contains("Gather velocity from the Search board"));
        assert!(output.contains("Mail {{missing}} notes"));
    }

    #[test]
    fn test_format_report_lists_errors_then_warnings() {
        use crate::model::ValidationError;

        let mut report = ValidationReport::new();
        report.errors.push(ValidationError::EmptyName);
        report.warnings.push("step 2 has no title".to_string());
        report.is_valid = false;

        let output = Formatter::format_report(&report);
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("error:"));
        assert!(lines[1].starts_with("warning:"));
    }
}
