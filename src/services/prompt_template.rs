use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::{AppError, AppResult};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{([a-z_][a-z0-9_]*)\}").expect("PLACEHOLDER is a valid regex pattern")
});

/// A prompt with `{name}` placeholders. Literal braces are written `{{` and `}}`.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    template: &'static str,
}

impl PromptTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Names of the placeholders in order of first appearance.
    pub fn variables(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for caps in PLACEHOLDER.captures_iter(self.template) {
            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn render(&self, values: &[(&str, &str)]) -> AppResult<String> {
        let values: HashMap<&str, &str> = values.iter().copied().collect();
        let mut missing = Vec::new();

        let rendered = PLACEHOLDER.replace_all(self.template, |caps: &Captures| {
            match caps.get(1) {
                Some(name) => match values.get(name.as_str()) {
                    Some(value) => value.to_string(),
                    None => {
                        missing.push(name.as_str().to_string());
                        String::new()
                    }
                },
                None if &caps[0] == "{{" => "{".to_string(),
                None => "}".to_string(),
            }
        });

        if !missing.is_empty() {
            return Err(AppError::InternalError(format!(
                "prompt is missing values for: {}",
                missing.join(", ")
            )));
        }
        Ok(rendered.into_owned())
    }
}
