// ABOUTME: Template generation through a generateContent-style LLM endpoint
// ABOUTME: Sends a schema-constrained prompt and sanitizes the reply into a template

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::model::{id, normalize, Template};

use super::error::{GenerateError, Result};

pub const DEFAULT_GENERATOR_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const SYSTEM_INSTRUCTION: &str = "You are an expert workflow architect. \
Your goal is to create structured workflow templates based on user requests. \
A workflow consists of a Name, Description, a list of Steps, and a list of Default Variables. \
Variables are crucial. They represent information captured once and reused. \
Example: For a webinar, \"Webinar Title\" and \"Date\" are variables. \
Return a JSON object matching the schema.";

/// Produces a template from a free-form prompt. Implementations are
/// opaque to callers; the CLI only sees the trait.
#[async_trait]
pub trait TemplateGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Template>;
}

/// Generator backed by a hosted model speaking the generateContent
/// protocol.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    base_url: String,
    model: String,
    api_key: String,
    http_client: Client,
}

impl HttpGenerator {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            http_client: Client::new(),
        }
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{
                    "text": format!("Create a detailed workflow template for: {prompt}")
                }]
            }],
            "systemInstruction": {
                "parts": [{"text": SYSTEM_INSTRUCTION}]
            },
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {"type": "STRING"},
                        "description": {"type": "STRING"},
                        "defaultVariables": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "key": {"type": "STRING", "description": "A short machine-readable key, e.g., 'webinarName'"},
                                    "label": {"type": "STRING", "description": "Human readable label, e.g., 'Webinar Name'"},
                                    "description": {"type": "STRING", "description": "Helper text for what to enter"},
                                    "value": {"type": "STRING", "description": "Leave empty, this is default"}
                                },
                                "required": ["key", "label", "value"]
                            }
                        },
                        "steps": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "title": {"type": "STRING"},
                                    "description": {"type": "STRING", "description": "Detailed instructions. Use {{key}} to reference variables."}
                                },
                                "required": ["title", "description"]
                            }
                        }
                    },
                    "required": ["name", "description", "defaultVariables", "steps"]
                }
            }
        })
    }
}

#[async_trait]
impl TemplateGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<Template> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::StatusError { status, body });
        }

        let data: Value = response.json().await?;
        let text = extract_text(&data).ok_or(GenerateError::EmptyResponse)?;
        let parsed: Value = serde_json::from_str(&text)?;

        let template = template_from_generated(&parsed);
        info!(
            "Generated template '{}' with {} steps",
            template.name,
            template.steps.len()
        );
        Ok(template)
    }
}

/// Joins the text parts of the first candidate. Models occasionally
/// split a reply across parts.
fn extract_text(data: &Value) -> Option<String> {
    let parts = data
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Sanitizes a generated record into a usable template: fresh local id,
/// placeholder name and step titles where the model left blanks, and
/// variable values cleared so defaults start empty.
pub fn template_from_generated(value: &Value) -> Template {
    let mut template = normalize::template_from_value(value);
    template.id = id::new_template_id();
    if template.name.is_empty() {
        template.name = "Untitled Workflow".to_string();
    }
    for variable in &mut template.default_variables {
        variable.value.clear();
    }
    for step in &mut template.steps {
        if step.title.is_empty() {
            step.title = "Untitled Step".to_string();
        }
    }
    template
}
