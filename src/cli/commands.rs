// ABOUTME: Command implementations for the stride CLI
// ABOUTME: Handles template management, run lifecycle, generation, and preview

use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use tracing::info;

use super::args::Args;
use super::config::Config;
use crate::generate::{HttpGenerator, TemplateGenerator};
use crate::model::{Run, Step, Template, Variable};
use crate::output::Formatter;
use crate::runtime::{self, latest_runs, Advance};
use crate::store::Store;

pub async fn template_list(store: &mut Store, formatter: &Formatter) -> Result<()> {
    store.refresh().await;
    print!("{}", formatter.format_template_list(store.templates())?);
    Ok(())
}

pub async fn template_show(store: &mut Store, formatter: &Formatter, reference: &str) -> Result<()> {
    store.refresh().await;
    let template = store.find_template(reference)?;
    print!("{}", formatter.format_template(template)?);
    Ok(())
}

pub async fn template_create(store: &mut Store, formatter: &Formatter, file: &Path) -> Result<()> {
    info!("Creating template from {}", file.display());

    let template = Template::from_file(file)?;
    let report = store.validate(&template);
    if report.has_errors() || report.has_warnings() {
        print!("{}", Formatter::format_report(&report));
    }

    store.refresh().await;
    let created = store.create_template(template).await?;
    println!("Created template '{}' ({})", created.name, created.id);
    print!("{}", formatter.format_template(&created)?);
    Ok(())
}

pub async fn template_update(store: &mut Store, _formatter: &Formatter, file: &Path) -> Result<()> {
    let template = Template::from_file(file)?;

    store.refresh().await;
    if store.find_template(&template.id).is_err() {
        anyhow::bail!(
            "No template with id '{}' exists; use 'template create' for new templates",
            template.id
        );
    }

    let report = store.validate(&template);
    if report.has_warnings() {
        print!("{}", Formatter::format_report(&report));
    }

    let updated = store.update_template(template).await?;
    if store.is_diverged(&updated.id) {
        println!(
            "Updated '{}' locally; backend sync failed and the change is kept for retry.",
            updated.name
        );
    } else {
        println!("Updated template '{}'", updated.name);
    }
    Ok(())
}

pub async fn template_delete(store: &mut Store, reference: &str) -> Result<()> {
    store.refresh().await;
    let name = store.find_template(reference)?.name.clone();
    store.delete_template(reference).await?;
    println!("Deleted template '{}'", name);
    Ok(())
}

/// Write a starter template YAML file the user can edit and then push
/// with `template create`.
pub fn template_init(name: &str, output_dir: &Path, kind: &str) -> Result<()> {
    if !output_dir.exists() {
        std::fs::create_dir_all(output_dir)?;
    }

    let template_file = output_dir.join(format!("{}.yaml", name));
    if template_file.exists() {
        anyhow::bail!("Template file already exists: {}", template_file.display());
    }

    let template = starter_template(name, kind)?;
    std::fs::write(&template_file, template.to_yaml()?)?;

    println!("Created template file: {}", template_file.display());
    println!("Edit it, then push it with: stride template create {}", template_file.display());
    Ok(())
}

pub async fn template_generate(
    store: &mut Store,
    formatter: &Formatter,
    config: &Config,
    prompt: &str,
    save: bool,
) -> Result<()> {
    let api_key = config.generator.api_key.clone().ok_or_else(|| {
        anyhow::anyhow!(
            "No generator API key configured. Set GEMINI_API_KEY or generator.api_key in stride.yaml"
        )
    })?;

    info!("Generating template with {}", config.generator.model);
    let generator = HttpGenerator::new(&config.generator.url, &config.generator.model, api_key);
    let template = generator.generate(prompt).await?;

    print!("{}", formatter.format_template(&template)?);

    if save {
        store.refresh().await;
        let created = store.create_template(template).await?;
        println!("\nSaved as template '{}' ({})", created.name, created.id);
    } else {
        println!("\nRun again with --save to keep it.");
    }
    Ok(())
}

pub async fn run_start(
    store: &mut Store,
    formatter: &Formatter,
    template_ref: &str,
    vars: &[String],
    name: Option<&str>,
) -> Result<()> {
    let overrides = Args::parse_variables(vars)?;

    store.refresh().await;
    let run = store.start_run(template_ref, name, &overrides).await?;
    println!("Started run {}", run.id);
    print!("{}", formatter.format_run(&run, Utc::now())?);
    Ok(())
}

pub async fn run_list(
    store: &mut Store,
    formatter: &Formatter,
    search: Option<&str>,
    history: bool,
) -> Result<()> {
    store.refresh().await;

    let mut selected: Vec<&Run> = if history {
        store.runs().iter().collect()
    } else {
        latest_runs(store.runs())
    };
    if let Some(query) = search {
        selected.retain(|run| run.matches_search(query));
    }

    print!("{}", formatter.format_run_list(&selected, Utc::now())?);
    Ok(())
}

pub async fn run_show(store: &mut Store, formatter: &Formatter, run_ref: &str) -> Result<()> {
    store.refresh().await;
    let run = store.find_run(run_ref)?;
    print!("{}", formatter.format_run(run, Utc::now())?);
    Ok(())
}

pub async fn run_next(store: &mut Store, formatter: &Formatter, run_ref: &str) -> Result<()> {
    store.refresh().await;
    let outcome = store.advance_step(run_ref).await?;
    let run = store.find_run(run_ref)?.clone();

    match outcome {
        Advance::Advanced { next_index } => {
            println!("Completed step {} of {}.", next_index, run.steps.len());
            if let Some(step) = run.current_step() {
                println!("Now at step {}: {}", next_index + 1, step.title);
            }
        }
        Advance::Finished => println!("Run complete."),
        Advance::AlreadyCompleted => println!("Run is already complete."),
    }
    note_divergence(store, &run.id);

    print!("{}", formatter.format_run(&run, Utc::now())?);
    Ok(())
}

pub async fn run_set(store: &mut Store, run_ref: &str, key: &str, value: &str) -> Result<()> {
    store.refresh().await;
    store.update_variable(run_ref, key, value).await?;
    println!("Set {} = {}", key, value);

    let id = store.find_run(run_ref)?.id.clone();
    note_divergence(store, &id);
    Ok(())
}

pub async fn run_add(store: &mut Store, run_ref: &str, label: &str, value: &str) -> Result<()> {
    store.refresh().await;
    let variable = store.add_variable(run_ref, label, value).await?;
    println!("Added variable {} ({})", variable.key, variable.label);

    let id = store.find_run(run_ref)?.id.clone();
    note_divergence(store, &id);
    Ok(())
}

pub async fn run_delete(store: &mut Store, run_ref: &str) -> Result<()> {
    store.refresh().await;
    let id = store.find_run(run_ref)?.id.clone();
    store.delete_run(run_ref).await?;
    println!("Deleted run {}", id);
    Ok(())
}

pub async fn preview(
    store: &mut Store,
    formatter: &Formatter,
    template_ref: &str,
    vars: &[String],
    step: Option<usize>,
) -> Result<()> {
    let overrides = Args::parse_variables(vars)?;

    store.refresh().await;
    let mut template = store.find_template(template_ref)?.clone();
    let seeded = runtime::start_run(&template, &overrides, Utc::now());

    if let Some(position) = step {
        if position == 0 || position > template.steps.len() {
            anyhow::bail!(
                "Step {} is out of range; template has {} steps",
                position,
                template.steps.len()
            );
        }
        template.steps = vec![template.steps[position - 1].clone()];
    }

    print!("{}", formatter.format_preview(&template, &seeded.variables)?);
    Ok(())
}

fn note_divergence(store: &Store, id: &str) {
    if store.is_diverged(id) {
        println!("Note: saved locally; backend sync failed and will be retried on the next change.");
    }
}

/// Generate starter template content
fn starter_template(name: &str, kind: &str) -> Result<Template> {
    match kind {
        "basic" => Ok(basic_template(name)),
        "webinar" => Ok(webinar_template(name)),
        "onboarding" => Ok(onboarding_template(name)),
        _ => Err(anyhow::anyhow!("Unknown starter kind: {}", kind)),
    }
}

fn basic_template(name: &str) -> Template {
    let mut template = Template::new(name);
    template.description = "A starter checklist".to_string();
    template.default_variables = vec![Variable::new("owner", "Owner")
        .with_description("Who is responsible for this work?")];
    template.steps = vec![
        Step::new("Kick off", "Confirm scope with {{owner}}."),
        Step::new("Do the work", ""),
        Step::new("Wrap up", "Share the outcome with {{owner}}."),
    ];
    template
}

fn webinar_template(name: &str) -> Template {
    let mut template = Template::new(name);
    template.description =
        "End-to-end process for creating, promoting, and hosting a webinar using Zoom and email marketing."
            .to_string();
    template.default_variables = vec![
        Variable::new("webinarTitle", "Webinar Title").with_description("The public facing name"),
        Variable::new("date", "Date & Time").with_description("When is it happening?"),
        Variable::new("speakerName", "Speaker Name").with_description("Who is presenting?"),
    ];
    template.steps = vec![
        Step::new(
            "Define Topic & Strategy",
            "Decide on the core topic for {{webinarTitle}}. Ensure it aligns with the quarterly goals for {{speakerName}}.",
        ),
        Step::new(
            "Create Zoom Meeting",
            "Go to Zoom and schedule a meeting for {{date}}. Copy the join link and add it to the variables panel on the right.",
        ),
        Step::new(
            "Build Landing Page",
            "Create a landing page using the title: {{webinarTitle}}. Paste the Zoom link from your context variables into the CTA button.",
        ),
        Step::new(
            "Send Invitations",
            "Send email blast inviting users to {{webinarTitle}} on {{date}}.",
        ),
    ];
    template
}

fn onboarding_template(name: &str) -> Template {
    let mut template = Template::new(name);
    template.description =
        "Standard procedure for welcoming a new team member and setting up their accounts."
            .to_string();
    template.default_variables = vec![
        Variable::new("employeeName", "Employee Name"),
        Variable::new("role", "Role"),
        Variable::new("email", "Company Email"),
    ];
    template.steps = vec![
        Step::new(
            "HR Paperwork",
            "Ensure {{employeeName}} has signed the offer letter and NDA.",
        ),
        Step::new(
            "IT Setup",
            "Provision a laptop and create the email account: {{email}}.",
        ),
        Step::new(
            "Team Intro",
            "Schedule a 30min intro meeting with the team for {{employeeName}} ({{role}}).",
        ),
    ];
    template
}
