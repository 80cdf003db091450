// ABOUTME: Core template data structure and recurrence configuration
// ABOUTME: Defines the reusable checklist shape that runs are instantiated from

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ModelError, Result, ValidationError};
use super::id;
use super::normalize;
use super::step::{Section, Step};
use super::variable::Variable;

pub const DEFAULT_ICON: &str = "📋";

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub default_variables: Vec<Variable>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_interval: Option<RecurrenceInterval>,
}

/// How often a recurring template is expected to be re-run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceInterval {
    Daily,
    Weekly,
    #[default]
    Biweekly,
    Monthly,
    Quarterly,
}

impl RecurrenceInterval {
    /// Days between expected runs. Months and quarters use the flat
    /// 30/90-day convention the overdue math is defined against.
    pub fn interval_days(&self) -> i64 {
        match self {
            RecurrenceInterval::Daily => 1,
            RecurrenceInterval::Weekly => 7,
            RecurrenceInterval::Biweekly => 14,
            RecurrenceInterval::Monthly => 30,
            RecurrenceInterval::Quarterly => 90,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceInterval::Daily => "daily",
            RecurrenceInterval::Weekly => "weekly",
            RecurrenceInterval::Biweekly => "biweekly",
            RecurrenceInterval::Monthly => "monthly",
            RecurrenceInterval::Quarterly => "quarterly",
        }
    }

    /// Parse a wire value. Unknown or empty strings collapse to the
    /// biweekly default rather than failing the whole read.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "daily" => RecurrenceInterval::Daily,
            "weekly" => RecurrenceInterval::Weekly,
            "biweekly" => RecurrenceInterval::Biweekly,
            "monthly" => RecurrenceInterval::Monthly,
            "quarterly" => RecurrenceInterval::Quarterly,
            _ => RecurrenceInterval::Biweekly,
        }
    }
}

impl std::fmt::Display for RecurrenceInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: id::new_template_id(),
            name: name.into(),
            description: String::new(),
            icon: default_icon(),
            default_variables: Vec::new(),
            steps: Vec::new(),
            sections: Vec::new(),
            is_recurring: false,
            recurrence_interval: None,
        }
    }

    /// Parse a template document from a YAML (or JSON) file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ModelError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse a template document from a YAML string. The document is
    /// normalized first, so loosely typed fields are coerced rather
    /// than rejected; structural invariants are still enforced.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_yaml::from_str(content).map_err(ModelError::YamlError)?;
        let template = normalize::template_from_value(&value);
        template.validate_structure()?;
        Ok(template)
    }

    /// Validate basic template structure
    pub fn validate_structure(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingField("name".to_string()));
        }

        if self.steps.is_empty() {
            return Err(ModelError::ValidationError(ValidationError::EmptyTemplate));
        }

        let mut keys = std::collections::HashSet::new();
        for (index, variable) in self.default_variables.iter().enumerate() {
            if variable.key.trim().is_empty() {
                return Err(ModelError::ValidationError(
                    ValidationError::EmptyVariableKey { index },
                ));
            }
            if !keys.insert(variable.key.clone()) {
                return Err(ModelError::ValidationError(
                    ValidationError::DuplicateVariableKey {
                        key: variable.key.clone(),
                    },
                ));
            }
        }

        let mut step_ids = std::collections::HashSet::new();
        for step in &self.steps {
            if !step_ids.insert(step.id.clone()) {
                return Err(ModelError::ValidationError(
                    ValidationError::DuplicateStepId {
                        id: step.id.clone(),
                    },
                ));
            }
        }

        Ok(())
    }

    /// Recurrence interval, visible only while the template is marked
    /// recurring. A stale interval on a non-recurring template is
    /// treated as absent.
    pub fn recurrence(&self) -> Option<RecurrenceInterval> {
        if self.is_recurring {
            Some(self.recurrence_interval.unwrap_or_default())
        } else {
            None
        }
    }

    /// Set recurrence coherently: turning it off clears the interval.
    pub fn set_recurrence(&mut self, interval: Option<RecurrenceInterval>) {
        self.is_recurring = interval.is_some();
        self.recurrence_interval = interval;
    }

    pub fn step_ids(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.id.clone()).collect()
    }

    pub fn get_step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn has_step(&self, step_id: &str) -> bool {
        self.get_step(step_id).is_some()
    }

    pub fn get_variable(&self, key: &str) -> Option<&Variable> {
        self.default_variables.iter().find(|v| v.key == key)
    }

    pub fn variable_keys(&self) -> Vec<String> {
        self.default_variables.iter().map(|v| v.key.clone()).collect()
    }

    /// Convert template back to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ModelError::YamlError)
    }

    /// Save template to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        std::fs::write(path.as_ref(), yaml).map_err(ModelError::IoError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_template() {
        let yaml = r#"
name: Release checklist
description: Ship a minor release
defaultVariables:
  - key: version
    label: Version
steps:
  - title: Tag the release
    description: "Tag {{version}} on the main branch"
  - title: Publish
    description: "Push the {{version}} artifacts"
"#;

        let template = Template::from_yaml(yaml).unwrap();
        assert_eq!(template.name, "Release checklist");
        assert_eq!(template.steps.len(), 2);
        assert_eq!(template.default_variables.len(), 1);
        assert_eq!(template.icon, DEFAULT_ICON);
        assert!(!template.is_recurring);
        assert!(template.recurrence().is_none());
    }

    #[test]
    fn test_parse_recurring_template() {
        let yaml = r#"
name: Weekly report
isRecurring: true
recurrenceInterval: weekly
steps:
  - title: Collect numbers
"#;

        let template = Template::from_yaml(yaml).unwrap();
        assert!(template.is_recurring);
        assert_eq!(template.recurrence(), Some(RecurrenceInterval::Weekly));
    }

    #[test]
    fn test_template_validation_empty_name() {
        let yaml = r#"
name: ""
steps:
  - title: Something
"#;

        let result = Template::from_yaml(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_template_validation_no_steps() {
        let yaml = r#"
name: Empty template
steps: []
"#;

        let result = Template::from_yaml(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_template_validation_duplicate_variable_keys() {
        let mut template = Template::new("dupes");
        template.steps.push(Step::new("One", ""));
        template.default_variables.push(Variable::new("x", "X"));
        template.default_variables.push(Variable::new("x", "X again"));

        let result = template.validate_structure();
        assert!(matches!(
            result,
            Err(ModelError::ValidationError(
                ValidationError::DuplicateVariableKey { .. }
            ))
        ));
    }

    #[test]
    fn test_stale_interval_hidden_when_not_recurring() {
        let mut template = Template::new("oneshot");
        template.recurrence_interval = Some(RecurrenceInterval::Monthly);

        assert!(template.recurrence().is_none());

        template.set_recurrence(Some(RecurrenceInterval::Weekly));
        assert!(template.is_recurring);
        assert_eq!(template.recurrence(), Some(RecurrenceInterval::Weekly));

        template.set_recurrence(None);
        assert!(!template.is_recurring);
        assert!(template.recurrence_interval.is_none());
    }

    #[test]
    fn test_interval_days() {
        assert_eq!(RecurrenceInterval::Daily.interval_days(), 1);
        assert_eq!(RecurrenceInterval::Weekly.interval_days(), 7);
        assert_eq!(RecurrenceInterval::Biweekly.interval_days(), 14);
        assert_eq!(RecurrenceInterval::Monthly.interval_days(), 30);
        assert_eq!(RecurrenceInterval::Quarterly.interval_days(), 90);
    }

    #[test]
    fn test_unknown_interval_falls_back_to_biweekly() {
        assert_eq!(
            RecurrenceInterval::from_wire("fortnightly"),
            RecurrenceInterval::Biweekly
        );
        assert_eq!(RecurrenceInterval::from_wire(""), RecurrenceInterval::Biweekly);
        assert_eq!(
            RecurrenceInterval::from_wire("quarterly"),
            RecurrenceInterval::Quarterly
        );
    }

    #[test]
    fn test_template_file_operations() {
        let template = {
            let mut t = Template::new("file ops");
            t.steps.push(Step::new("Only step", "Do the {{thing}}"));
            t
        };

        let mut temp_file = NamedTempFile::new().unwrap();
        let yaml = template.to_yaml().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let loaded = Template::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.name, template.name);
        assert_eq!(loaded.steps.len(), template.steps.len());
        assert_eq!(loaded.steps[0].description, "Do the {{thing}}");
    }
}
