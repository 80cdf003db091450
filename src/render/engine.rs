// ABOUTME: Placeholder substitution engine for step text
// ABOUTME: Scans {{key}} tokens into typed display nodes; unknown tokens pass through

use indexmap::IndexSet;
use regex::Regex;

use super::error::Result;
use crate::model::Variable;

/// Placeholder tokens: double braces around a key, shortest match,
/// never spanning a line break.
const TOKEN_PATTERN: &str = r"\{\{(.*?)\}\}";

const URL_PATTERN: &str = r#"https?://[^\s<>"']+"#;

/// One piece of rendered step text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, including any token that did not resolve.
    Text(String),
    /// A resolved placeholder carrying the variable's current value.
    Variable { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Renderer {
    pub(super) token: Regex,
    pub(super) url: Regex,
}

impl Renderer {
    /// Create a renderer with compiled patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            token: Regex::new(TOKEN_PATTERN)?,
            url: Regex::new(URL_PATTERN)?,
        })
    }

    /// Split text into display nodes. Keys are trimmed inside the
    /// braces and matched case-sensitively against the variable list.
    /// A token with no matching variable stays in the output as
    /// literal text, braces included; malformed braces are plain text.
    pub fn render(&self, text: &str, variables: &[Variable]) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut last = 0;

        for caps in self.token.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            if whole.start() > last {
                nodes.push(Node::Text(text[last..whole.start()].to_string()));
            }

            let key = inner.as_str().trim();
            match variables.iter().find(|v| v.key == key) {
                Some(variable) => nodes.push(Node::Variable {
                    key: key.to_string(),
                    value: variable.value.clone(),
                }),
                None => nodes.push(Node::Text(whole.as_str().to_string())),
            }

            last = whole.end();
        }

        if last < text.len() {
            nodes.push(Node::Text(text[last..].to_string()));
        }

        nodes
    }

    /// Flatten rendered nodes into plain text.
    pub fn render_to_string(&self, text: &str, variables: &[Variable]) -> String {
        self.render(text, variables)
            .into_iter()
            .map(|node| match node {
                Node::Text(s) => s,
                Node::Variable { value, .. } => value,
            })
            .collect()
    }

    /// Check if a string contains placeholder tokens
    pub fn has_tokens(&self, text: &str) -> bool {
        self.token.is_match(text)
    }

    /// Distinct keys referenced by a text, in order of first appearance.
    pub fn token_keys(&self, text: &str) -> Vec<String> {
        let mut keys: IndexSet<String> = IndexSet::new();
        for caps in self.token.captures_iter(text) {
            if let Some(inner) = caps.get(1) {
                keys.insert(inner.as_str().trim().to_string());
            }
        }
        keys.into_iter().collect()
    }
}
