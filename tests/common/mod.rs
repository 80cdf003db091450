// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides shared builders for templates, runs, and backend wire payloads

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stride::api::ApiClient;
use stride::model::{RecurrenceInterval, Step, Template, Variable};
use stride::store::Store;

pub struct TestTemplateBuilder {
    template: Template,
}

impl TestTemplateBuilder {
    pub fn new(name: &str) -> Self {
        let mut template = Template::new(name);
        template.description = format!("Test template: {}", name);
        Self { template }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.template.id = id.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.template.description = description.to_string();
        self
    }

    pub fn with_variable(mut self, key: &str, label: &str) -> Self {
        self.template.default_variables.push(Variable::new(key, label));
        self
    }

    pub fn with_filled_variable(mut self, key: &str, label: &str, value: &str) -> Self {
        self.template
            .default_variables
            .push(Variable::new(key, label).with_value(value));
        self
    }

    pub fn with_step(mut self, title: &str, description: &str) -> Self {
        self.template.steps.push(Step::new(title, description));
        self
    }

    pub fn with_identified_step(mut self, id: &str, title: &str, description: &str) -> Self {
        self.template
            .steps
            .push(Step::new(title, description).with_id(id));
        self
    }

    pub fn recurring(mut self, interval: RecurrenceInterval) -> Self {
        self.template.set_recurrence(Some(interval));
        self
    }

    pub fn build(&self) -> Template {
        self.template.clone()
    }

    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.generate_yaml())
    }

    fn generate_yaml(&self) -> String {
        let mut yaml = format!(
            "name: {}\ndescription: \"{}\"\n",
            self.template.name, self.template.description
        );

        if self.template.is_recurring {
            yaml.push_str("isRecurring: true\n");
            if let Some(interval) = self.template.recurrence_interval {
                yaml.push_str(&format!("recurrenceInterval: {}\n", interval));
            }
        }

        if !self.template.default_variables.is_empty() {
            yaml.push_str("defaultVariables:\n");
            for variable in &self.template.default_variables {
                yaml.push_str(&format!(
                    "  - key: {}\n    label: \"{}\"\n",
                    variable.key, variable.label
                ));
                if !variable.value.is_empty() {
                    yaml.push_str(&format!("    value: \"{}\"\n", variable.value));
                }
            }
        }

        yaml.push_str("steps:\n");
        for step in &self.template.steps {
            yaml.push_str(&format!("  - title: \"{}\"\n", step.title));
            if !step.description.is_empty() {
                yaml.push_str(&format!("    description: \"{}\"\n", step.description));
            }
        }

        yaml
    }
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn template_file(&self, name: &str) -> PathBuf {
        self.path().join(format!("{}.yaml", name))
    }

    pub fn create_template_file(&self, name: &str, builder: &TestTemplateBuilder) -> PathBuf {
        let template_file = self.template_file(name);
        builder
            .write_to_file(&template_file)
            .expect("Failed to write template file");
        template_file
    }
}

/// Mock backend wrapping a wiremock server. Stubs speak the same wire
/// vocabulary as the real REST API.
pub struct TestBackend {
    server: MockServer,
}

impl TestBackend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.server.uri(), Duration::from_secs(5)).expect("Failed to build client")
    }

    pub fn store(&self) -> Store {
        Store::new(self.client())
    }

    pub async fn stub_template_list(&self, templates: Value) {
        Mock::given(method("GET"))
            .and(path("/templates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(templates))
            .mount(&self.server)
            .await;
    }

    pub async fn stub_run_list(&self, runs: Value) {
        Mock::given(method("GET"))
            .and(path("/runs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(runs))
            .mount(&self.server)
            .await;
    }

    pub async fn stub_empty_lists(&self) {
        self.stub_template_list(json!([])).await;
        self.stub_run_list(json!([])).await;
    }
}

/// Template record shaped the way the backend returns it: camelCase
/// metadata with snake_case step records nested inside.
pub fn template_wire(id: &str, name: &str, steps: Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("Test template: {}", name),
        "icon": "📋",
        "isRecurring": false,
        "recurrenceInterval": null,
        "variables": [],
        "steps": steps,
    })
}

pub fn step_wire(id: &str, title: &str, description: &str, order: u32) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": description,
        "is_required": true,
        "order_index": order,
    })
}

/// Run record in backend shape, embedding its template.
pub fn run_wire(id: &str, template: &Value, status: &str) -> Value {
    json!({
        "id": id,
        "template_id": template["id"],
        "name": template["name"],
        "template": template,
        "status": status,
        "current_step_index": 0,
        "variables": [],
        "steps": [],
        "completed": status == "done",
        "completed_at": null,
        "created_at": "2025-11-03T09:00:00Z",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_builder_yaml() {
        let builder = TestTemplateBuilder::new("release")
            .with_description("Ship a release")
            .with_variable("version", "Version")
            .with_step("Tag", "Tag {{version}} on main");

        let yaml = builder.generate_yaml();

        assert!(yaml.contains("name: release"));
        assert!(yaml.contains("description: \"Ship a release\""));
        assert!(yaml.contains("key: version"));
        assert!(yaml.contains("- title: \"Tag\""));
        assert!(yaml.contains("Tag {{version}} on main"));
    }

    #[test]
    fn test_recurring_builder_yaml() {
        let builder = TestTemplateBuilder::new("weekly")
            .with_step("Report", "")
            .recurring(RecurrenceInterval::Weekly);

        let yaml = builder.generate_yaml();
        assert!(yaml.contains("isRecurring: true"));
        assert!(yaml.contains("recurrenceInterval: weekly"));
    }

    #[test]
    fn test_environment_setup() {
        let env = TestEnvironment::new();
        assert!(env.path().exists());

        let template_file = env.template_file("test");
        assert!(template_file.to_string_lossy().contains("test.yaml"));
    }

    #[test]
    fn test_wire_payload_shapes() {
        let template = template_wire("1", "Webinar", json!([step_wire("10", "Plan", "", 1)]));
        assert_eq!(template["isRecurring"], json!(false));
        assert_eq!(template["steps"][0]["order_index"], json!(1));

        let run = run_wire("run_1", &template, "in_progress");
        assert_eq!(run["template_id"], json!("1"));
        assert_eq!(run["completed"], json!(false));
    }
}
