// ABOUTME: Cached view of backend templates and runs with sync-on-write
// ABOUTME: Applies changes locally and tracks runs the backend has not accepted

pub mod error;

use std::collections::HashSet;

use chrono::Utc;
use tracing::{instrument, warn};

use crate::api::ApiClient;
use crate::model::{ModelError, Run, Template, TemplateValidator, ValidationReport, Variable};
use crate::runtime::{self, Advance, RuntimeError};

pub use error::{Result, StoreError};

/// Variable keys are the label with the whitespace squeezed out, so
/// `Event Date` becomes `EventDate`.
fn variable_key_from_label(label: &str) -> String {
    label.split_whitespace().collect()
}

/// Holds the last known backend state plus any local changes that
/// failed to sync. Reads fall back to the cache; writes apply locally
/// first and record divergence instead of rolling back.
pub struct Store {
    client: ApiClient,
    validator: TemplateValidator,
    templates: Vec<Template>,
    runs: Vec<Run>,
    diverged: HashSet<String>,
}

impl Store {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            validator: TemplateValidator::new(),
            templates: Vec::new(),
            runs: Vec::new(),
            diverged: HashSet::new(),
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Entities whose local state is ahead of the backend.
    pub fn is_diverged(&self, id: &str) -> bool {
        self.diverged.contains(id)
    }

    pub fn validate(&self, template: &Template) -> ValidationReport {
        self.validator.validate(template)
    }

    /// Reloads both caches. A failed fetch keeps whatever was loaded
    /// before instead of wiping the cache.
    pub async fn refresh(&mut self) {
        match self.client.list_templates().await {
            Ok(templates) => self.templates = templates,
            Err(err) => warn!("Using cached templates, refresh failed: {}", err),
        }
        match self.client.list_runs().await {
            Ok(runs) => self.runs = runs,
            Err(err) => warn!("Using cached runs, refresh failed: {}", err),
        }
    }

    /// Looks a template up by id, then by case-insensitive name.
    pub fn find_template(&self, reference: &str) -> Result<&Template> {
        if let Some(template) = self.templates.iter().find(|t| t.id == reference) {
            return Ok(template);
        }
        let lowered = reference.to_lowercase();
        self.templates
            .iter()
            .find(|t| t.name.to_lowercase() == lowered)
            .ok_or_else(|| StoreError::TemplateNotFound(reference.to_string()))
    }

    /// Looks a run up by exact id, then by unique id prefix.
    pub fn find_run(&self, reference: &str) -> Result<&Run> {
        self.find_run_index(reference).map(|index| &self.runs[index])
    }

    pub async fn create_template(&mut self, template: Template) -> Result<Template> {
        self.ensure_valid(&template)?;
        let created = self.client.create_template(&template).await?;
        self.templates.push(created.clone());
        Ok(created)
    }

    /// Applies the update locally, then syncs. When the backend rejects
    /// the update the local version stays and the template is marked
    /// diverged.
    pub async fn update_template(&mut self, template: Template) -> Result<Template> {
        self.ensure_valid(&template)?;
        let id = template.id.clone();
        match self.templates.iter_mut().find(|t| t.id == id) {
            Some(slot) => *slot = template.clone(),
            None => self.templates.push(template.clone()),
        }

        match self.client.update_template(&template).await {
            Ok(updated) => {
                if let Some(slot) = self.templates.iter_mut().find(|t| t.id == id) {
                    *slot = updated.clone();
                }
                self.diverged.remove(&id);
                Ok(updated)
            }
            Err(err) => {
                warn!("Keeping local changes for template {}: {}", id, err);
                self.diverged.insert(id);
                Ok(template)
            }
        }
    }

    /// Deletes remotely first; the cache only changes once the backend
    /// confirms. Existing runs keep their copied steps and stay usable.
    pub async fn delete_template(&mut self, reference: &str) -> Result<()> {
        let id = self.find_template(reference)?.id.clone();
        self.client.delete_template(&id).await?;
        self.templates.retain(|t| t.id != id);
        self.diverged.remove(&id);
        Ok(())
    }

    /// Starts a run of the template, seeding its variables from the
    /// template defaults with the given overrides applied.
    pub async fn start_run(
        &mut self,
        template_ref: &str,
        name: Option<&str>,
        overrides: &[Variable],
    ) -> Result<Run> {
        let template = self.find_template(template_ref)?.clone();
        let seeded = runtime::start_run(&template, overrides, Utc::now());
        let name = name.unwrap_or(&template.name);

        let run = self
            .client
            .create_run(&template, name, &seeded.variables)
            .await?;
        self.runs.push(run.clone());
        Ok(run)
    }

    /// Completes the current step and moves the cursor. The local run
    /// advances even when the backend sync fails; the run is then
    /// marked diverged and retried on the next write.
    #[instrument(skip(self, run_ref), fields(run = %run_ref))]
    pub async fn advance_step(&mut self, run_ref: &str) -> Result<Advance> {
        let index = self.find_run_index(run_ref)?;
        let (outcome, run_id, completing) = {
            let run = &mut self.runs[index];
            let completing = run.current_step().and_then(|step| step.run_step_id.clone());
            let outcome = runtime::complete_current_and_advance(run, Utc::now());
            (outcome, run.id.clone(), completing)
        };
        if outcome == Advance::AlreadyCompleted {
            return Ok(outcome);
        }

        let snapshot = self.runs[index].clone();
        match self.push_run_progress(&snapshot, completing.as_deref()).await {
            Ok(()) => {
                self.diverged.remove(&run_id);
            }
            Err(err) => {
                warn!("Run {} is ahead of the backend: {}", run_id, err);
                self.diverged.insert(run_id);
            }
        }
        Ok(outcome)
    }

    /// Sets an existing run variable and syncs.
    pub async fn update_variable(&mut self, run_ref: &str, key: &str, value: &str) -> Result<()> {
        let index = self.find_run_index(run_ref)?;
        let run = &mut self.runs[index];
        if !run.set_variable(key, value) {
            return Err(StoreError::RuntimeError(RuntimeError::VariableNotFound {
                key: key.to_string(),
            }));
        }
        self.sync_run_state(index).await;
        Ok(())
    }

    /// Adds a variable to a running run. The key is derived from the
    /// label; adding a label whose key already exists updates the value
    /// instead.
    pub async fn add_variable(
        &mut self,
        run_ref: &str,
        label: &str,
        value: &str,
    ) -> Result<Variable> {
        let key = variable_key_from_label(label);
        if key.is_empty() {
            return Err(StoreError::ModelError(ModelError::MissingField(
                "variable label".to_string(),
            )));
        }

        let index = self.find_run_index(run_ref)?;
        let run = &mut self.runs[index];
        let variable = match run.get_variable_mut(&key) {
            Some(existing) => {
                existing.value = value.to_string();
                existing.clone()
            }
            None => {
                let variable = Variable::new(key, label)
                    .with_value(value)
                    .with_description("Added during run");
                run.variables.push(variable.clone());
                variable
            }
        };

        self.sync_run_state(index).await;
        Ok(variable)
    }

    pub async fn delete_run(&mut self, run_ref: &str) -> Result<()> {
        let id = self.find_run(run_ref)?.id.clone();
        self.client.delete_run(&id).await?;
        self.runs.retain(|r| r.id != id);
        self.diverged.remove(&id);
        Ok(())
    }

    fn ensure_valid(&self, template: &Template) -> Result<()> {
        let report = self.validator.validate(template);
        if let Some(error) = report.errors.first() {
            return Err(StoreError::ModelError(ModelError::from(error.clone())));
        }
        Ok(())
    }

    fn find_run_index(&self, reference: &str) -> Result<usize> {
        if let Some(index) = self.runs.iter().position(|r| r.id == reference) {
            return Ok(index);
        }
        let matches: Vec<usize> = self
            .runs
            .iter()
            .enumerate()
            .filter(|(_, run)| run.id.starts_with(reference))
            .map(|(index, _)| index)
            .collect();
        match matches.as_slice() {
            [] => Err(StoreError::RunNotFound(reference.to_string())),
            [index] => Ok(*index),
            _ => Err(StoreError::AmbiguousRun(reference.to_string())),
        }
    }

    async fn push_run_progress(&self, run: &Run, completed_step: Option<&str>) -> Result<()> {
        if let Some(run_step_id) = completed_step {
            self.client.complete_step(&run.id, run_step_id).await?;
        }
        self.client.update_run(run).await?;
        Ok(())
    }

    async fn sync_run_state(&mut self, index: usize) {
        let snapshot = self.runs[index].clone();
        match self.client.update_run(&snapshot).await {
            Ok(_) => {
                self.diverged.remove(&snapshot.id);
            }
            Err(err) => {
                warn!("Keeping local changes for run {}: {}", snapshot.id, err);
                self.diverged.insert(snapshot.id.clone());
            }
        }
    }
}
