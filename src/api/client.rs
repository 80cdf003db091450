// ABOUTME: HTTP client for the workflow backend REST API
// ABOUTME: Covers template CRUD, per-step sync, and run lifecycle endpoints

use std::time::Duration;

use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::model::{id, normalize, Run, Template, Variable};

use super::error::{ApiError, Result};
use super::wire::{
    self, RunCreatePayload, RunUpdatePayload, StepPayload, StepStatusPayload, TemplateMetaPayload,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8003/api/v1";

/// Client for the workflow backend. Templates and runs are stored
/// remotely; this type speaks the backend's mixed wire vocabulary and
/// hands back domain types.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>> {
        let data = self.get_json("/templates", "Listing templates").await?;
        let records = data.as_array().cloned().unwrap_or_default();
        Ok(records.iter().map(normalize::template_from_value).collect())
    }

    pub async fn get_template(&self, template_id: &str) -> Result<Template> {
        let data = self
            .get_json(&format!("/templates/{template_id}"), "Fetching template")
            .await?;
        Ok(normalize::template_from_value(&data))
    }

    /// Creates the template metadata, then pushes each step through the
    /// step endpoint, then re-reads the whole record so the caller gets
    /// backend-assigned ids.
    pub async fn create_template(&self, template: &Template) -> Result<Template> {
        let payload = TemplateMetaPayload::from_template(template);
        let data = self.post_json("/templates", &payload, "Creating template").await?;

        let mut created_id = normalize::coerce_string(data.get("id"));
        if created_id.is_empty() {
            created_id = template.id.clone();
        }

        for (position, step) in template.steps.iter().enumerate() {
            let step_payload = StepPayload::from_step(step, position);
            self.post_json(
                &format!("/templates/{created_id}/steps"),
                &step_payload,
                "Creating template step",
            )
            .await?;
        }

        info!(
            "Created template '{}' with {} steps",
            template.name,
            template.steps.len()
        );
        self.get_template(&created_id).await
    }

    /// Updates the metadata, then reconciles the step list: backend
    /// steps missing locally are deleted, locally minted steps are
    /// created, the rest are patched with fresh positions.
    pub async fn update_template(&self, template: &Template) -> Result<Template> {
        let payload = TemplateMetaPayload::from_template(template);
        let data = self
            .patch_json(
                &format!("/templates/{}", template.id),
                &payload,
                "Updating template",
            )
            .await?;

        let local_ids: Vec<&str> = template.steps.iter().map(|step| step.id.as_str()).collect();
        let existing = data
            .get("steps")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for record in &existing {
            let backend_id = normalize::coerce_string(record.get("id"));
            if backend_id.is_empty() || local_ids.contains(&backend_id.as_str()) {
                continue;
            }
            self.delete(&format!("/template-steps/{backend_id}"), "Deleting template step")
                .await?;
        }

        for (position, step) in template.steps.iter().enumerate() {
            let step_payload = StepPayload::from_step(step, position);
            if id::is_local_step_id(&step.id) {
                self.post_json(
                    &format!("/templates/{}/steps", template.id),
                    &step_payload,
                    "Creating template step",
                )
                .await?;
            } else {
                self.patch_json(
                    &format!("/template-steps/{}", step.id),
                    &step_payload,
                    "Updating template step",
                )
                .await?;
            }
        }

        info!("Updated template '{}'", template.name);
        self.get_template(&template.id).await
    }

    pub async fn delete_template(&self, template_id: &str) -> Result<()> {
        self.delete(&format!("/templates/{template_id}"), "Deleting template")
            .await?;
        info!("Deleted template {}", template_id);
        Ok(())
    }

    pub async fn list_runs(&self) -> Result<Vec<Run>> {
        let data = self.get_json("/runs", "Listing runs").await?;
        let records = data.as_array().cloned().unwrap_or_default();
        Ok(records.iter().map(wire::run_from_wire).collect())
    }

    pub async fn get_run(&self, run_id: &str) -> Result<Run> {
        let data = self
            .get_json(&format!("/runs/{run_id}"), "Fetching run")
            .await?;
        Ok(wire::run_from_wire(&data))
    }

    /// Starts a run of the given template. The response may omit the
    /// embedded template, so the known one fills the gaps.
    pub async fn create_run(
        &self,
        template: &Template,
        name: &str,
        variables: &[Variable],
    ) -> Result<Run> {
        let payload = RunCreatePayload {
            name: name.to_string(),
            variables: variables.to_vec(),
        };
        let data = self
            .post_json(
                &format!("/templates/{}/runs", template.id),
                &payload,
                "Starting run",
            )
            .await?;

        info!("Started run '{}' of template '{}'", name, template.name);
        let template_value = serde_json::to_value(template)?;
        Ok(wire::run_from_wire_with(&data, &template_value))
    }

    pub async fn update_run(&self, run: &Run) -> Result<Run> {
        let payload = RunUpdatePayload::from_run(run);
        let data = self
            .patch_json(&format!("/runs/{}", run.id), &payload, "Updating run")
            .await?;
        Ok(wire::run_from_wire(&data))
    }

    pub async fn delete_run(&self, run_id: &str) -> Result<()> {
        self.delete(&format!("/runs/{run_id}"), "Deleting run").await?;
        info!("Deleted run {}", run_id);
        Ok(())
    }

    /// Marks one execution record done. Only steps that came back from
    /// the backend with a run-step id can be completed this way.
    pub async fn complete_step(&self, run_id: &str, run_step_id: &str) -> Result<()> {
        self.patch_json(
            &format!("/runs/{run_id}/steps/{run_step_id}"),
            &StepStatusPayload::done(),
            "Completing step",
        )
        .await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, context: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.http_client.get(&url).send().await?;
        Self::read_json(response, context).await
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        context: &str,
    ) -> Result<Value> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.http_client.post(&url).json(payload).send().await?;
        Self::read_json(response, context).await
    }

    async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        context: &str,
    ) -> Result<Value> {
        let url = self.url(path);
        debug!("PATCH {}", url);
        let response = self.http_client.patch(&url).json(payload).send().await?;
        Self::read_json(response, context).await
    }

    async fn delete(&self, path: &str, context: &str) -> Result<()> {
        let url = self.url(path);
        debug!("DELETE {}", url);
        let response = self.http_client.delete(&url).send().await?;
        Self::ensure_success(response, context).await?;
        Ok(())
    }

    async fn read_json(response: Response, context: &str) -> Result<Value> {
        let response = Self::ensure_success(response, context).await?;
        Ok(response.json().await?)
    }

    async fn ensure_success(response: Response, context: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::StatusError {
            context: context.to_string(),
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8003/api/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8003/api/v1");
        assert_eq!(client.url("/templates"), "http://localhost:8003/api/v1/templates");
    }
}
