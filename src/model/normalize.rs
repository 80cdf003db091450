// ABOUTME: Lenient coercion boundary for template data entering the system
// ABOUTME: Backend reads, AI output, and local documents all pass through here

use serde_json::{Map, Value};

use super::id;
use super::step::{Section, Step};
use super::template::{RecurrenceInterval, Template, DEFAULT_ICON};
use super::variable::Variable;

/// Coerce a loosely typed JSON value into a string. Missing values,
/// nulls, and structured values collapse to the empty string; numbers
/// and booleans print as their literal text.
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Truthiness for flags that arrive as assorted scalar types: booleans
/// as-is, nonzero numbers and non-empty strings count as true.
pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

/// First matching field name wins; record shapes vary between the
/// document form and the wire form.
pub(crate) fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn variable_from_value(value: &Value) -> Option<Variable> {
    let obj = value.as_object()?;
    let key = coerce_string(obj.get("key"));
    let label = non_empty(coerce_string(obj.get("label"))).unwrap_or_else(|| key.clone());
    Some(Variable {
        key,
        label,
        value: coerce_string(obj.get("value")),
        description: non_empty(coerce_string(obj.get("description"))),
    })
}

/// Variables arrive either as a list of records or as a bare
/// key-to-value map; both normalize to the same list shape.
pub fn variables_from_value(value: Option<&Value>) -> Vec<Variable> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(variable_from_value).collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, val)| Variable {
                key: key.clone(),
                label: key.clone(),
                value: coerce_string(Some(val)),
                description: None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// A template step record. Missing ids are minted locally; run state
/// never survives on a template step.
pub fn step_from_value(value: &Value) -> Option<Step> {
    let obj = value.as_object()?;
    Some(Step {
        id: non_empty(coerce_string(obj.get("id"))).unwrap_or_else(id::new_step_id),
        run_step_id: None,
        title: coerce_string(obj.get("title")),
        description: coerce_string(obj.get("description")),
        completed: false,
        section_id: non_empty(coerce_string(field(obj, &["sectionId", "section_id"]))),
    })
}

pub fn section_from_value(value: &Value) -> Option<Section> {
    let obj = value.as_object()?;
    Some(Section {
        id: non_empty(coerce_string(obj.get("id"))).unwrap_or_else(id::new_section_id),
        title: coerce_string(obj.get("title")),
        is_collapsed: coerce_bool(field(obj, &["isCollapsed", "is_collapsed"])),
    })
}

/// Normalize a template record of unknown provenance. Every field is
/// coerced to its expected shape; nothing here fails. Invariants such
/// as key uniqueness are the validator's business, not repaired here.
pub fn template_from_value(value: &Value) -> Template {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    let is_recurring = coerce_bool(field(obj, &["isRecurring", "is_recurring"]));
    let recurrence_interval = if is_recurring {
        let raw = coerce_string(field(obj, &["recurrenceInterval", "recurrence_interval"]));
        Some(RecurrenceInterval::from_wire(&raw))
    } else {
        None
    };

    let steps = match obj.get("steps") {
        Some(Value::Array(items)) => items.iter().filter_map(step_from_value).collect(),
        _ => Vec::new(),
    };
    let sections = match obj.get("sections") {
        Some(Value::Array(items)) => items.iter().filter_map(section_from_value).collect(),
        _ => Vec::new(),
    };

    Template {
        id: non_empty(coerce_string(obj.get("id"))).unwrap_or_else(id::new_template_id),
        name: coerce_string(obj.get("name")),
        description: coerce_string(obj.get("description")),
        icon: non_empty(coerce_string(obj.get("icon"))).unwrap_or_else(|| DEFAULT_ICON.to_string()),
        default_variables: variables_from_value(field(
            obj,
            &["defaultVariables", "default_variables", "variables"],
        )),
        steps,
        sections,
        is_recurring,
        recurrence_interval,
    }
}
