// ABOUTME: Template validation logic producing a full error/warning report
// ABOUTME: Invariant violations are reported, never silently repaired

use std::collections::HashSet;

use super::error::ValidationError;
use super::template::Template;

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
    pub is_valid: bool,
}

pub struct TemplateValidator {
    strict_mode: bool,
}

impl TemplateValidator {
    pub fn new() -> Self {
        Self { strict_mode: false }
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Validate a complete template
    pub fn validate(&self, template: &Template) -> ValidationReport {
        let mut report = ValidationReport::new();

        if template.name.trim().is_empty() {
            report.errors.push(ValidationError::EmptyName);
        }

        if template.steps.is_empty() {
            report.errors.push(ValidationError::EmptyTemplate);
        }

        self.validate_variables(template, &mut report);
        self.validate_steps(template, &mut report);

        report.is_valid = report.errors.is_empty();
        report
    }

    fn validate_variables(&self, template: &Template, report: &mut ValidationReport) {
        let mut keys = HashSet::new();
        for (index, variable) in template.default_variables.iter().enumerate() {
            if variable.key.trim().is_empty() {
                report
                    .errors
                    .push(ValidationError::EmptyVariableKey { index });
                continue;
            }
            if !keys.insert(variable.key.clone()) {
                report.errors.push(ValidationError::DuplicateVariableKey {
                    key: variable.key.clone(),
                });
            }
        }
    }

    fn validate_steps(&self, template: &Template, report: &mut ValidationReport) {
        let section_ids: HashSet<&str> =
            template.sections.iter().map(|s| s.id.as_str()).collect();

        let mut step_ids = HashSet::new();
        for step in &template.steps {
            if !step_ids.insert(step.id.clone()) {
                report.errors.push(ValidationError::DuplicateStepId {
                    id: step.id.clone(),
                });
            }

            if step.title.trim().is_empty() {
                report
                    .warnings
                    .push(format!("Step '{}' has no title", step.id));
            }

            if let Some(ref section_id) = step.section_id {
                if !section_ids.contains(section_id.as_str()) {
                    report.warnings.push(format!(
                        "Step '{}' references unknown section '{}'",
                        step.id, section_id
                    ));
                }
            }

            if let Err(reason) = check_placeholder_syntax(&step.description) {
                if self.strict_mode {
                    report.errors.push(ValidationError::UnbalancedBraces {
                        step: step.id.clone(),
                    });
                } else {
                    report
                        .warnings
                        .push(format!("Step '{}': {}", step.id, reason));
                }
            }
        }
    }
}

/// Basic placeholder syntax check. Malformed tokens still render as
/// literal text, so outside strict mode this only produces warnings.
fn check_placeholder_syntax(text: &str) -> std::result::Result<(), String> {
    let bytes = text.as_bytes();
    let mut open = false;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
            if open {
                return Err("nested placeholder braces".to_string());
            }
            open = true;
            i += 2;
            continue;
        }
        if bytes[i] == b'}' && i + 1 < bytes.len() && bytes[i + 1] == b'}' {
            if !open {
                return Err("unmatched closing braces".to_string());
            }
            open = false;
            i += 2;
            continue;
        }
        i += 1;
    }

    if open {
        return Err("unclosed placeholder braces".to_string());
    }

    Ok(())
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            is_valid: true,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl Default for TemplateValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::step::Step;
    use crate::model::variable::Variable;

    fn valid_template() -> Template {
        let mut template = Template::new("Valid");
        template.default_variables.push(Variable::new("x", "X"));
        template
            .steps
            .push(Step::new("Only step", "Use {{x}} here").with_id("1"));
        template
    }

    #[test]
    fn test_valid_template_passes() {
        let report = TemplateValidator::new().validate(&valid_template());
        assert!(report.is_valid);
        assert!(!report.has_errors());
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_duplicate_step_ids_reported() {
        let mut template = valid_template();
        template.steps.push(Step::new("Copycat", "").with_id("1"));

        let report = TemplateValidator::new().validate(&template);
        assert!(report.has_errors());
        assert!(matches!(
            report.errors[0],
            ValidationError::DuplicateStepId { .. }
        ));
    }

    #[test]
    fn test_empty_variable_key_reported() {
        let mut template = valid_template();
        template.default_variables.push(Variable::new("", "Blank"));

        let report = TemplateValidator::new().validate(&template);
        assert!(report.has_errors());
        assert!(matches!(
            report.errors[0],
            ValidationError::EmptyVariableKey { index: 1 }
        ));
    }

    #[test]
    fn test_unclosed_braces_warn_by_default() {
        let mut template = valid_template();
        template.steps[0].description = "Use {{x here".to_string();

        let report = TemplateValidator::new().validate(&template);
        assert!(report.is_valid);
        assert!(report.has_warnings());
    }

    #[test]
    fn test_unclosed_braces_error_in_strict_mode() {
        let mut template = valid_template();
        template.steps[0].description = "Use {{x here".to_string();

        let report = TemplateValidator::new()
            .with_strict_mode(true)
            .validate(&template);
        assert!(!report.is_valid);
        assert!(matches!(
            report.errors[0],
            ValidationError::UnbalancedBraces { .. }
        ));
    }

    #[test]
    fn test_unknown_section_reference_warns() {
        let mut template = valid_template();
        template.steps[0].section_id = Some("missing".to_string());

        let report = TemplateValidator::new().validate(&template);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("unknown section"));
    }

    #[test]
    fn test_placeholder_syntax_scan() {
        assert!(check_placeholder_syntax("no tokens at all").is_ok());
        assert!(check_placeholder_syntax("{{a}} then {{b}}").is_ok());
        assert!(check_placeholder_syntax("{{a}").is_err());
        assert!(check_placeholder_syntax("a}} b").is_err());
        assert!(check_placeholder_syntax("{{a {{b}} }}").is_err());
    }
}
