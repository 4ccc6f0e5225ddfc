//! Turns free-form model replies into typed, validated values.
//!
//! Replies are tolerated with markdown fences and chatter around the JSON
//! object; the first balanced object is what gets deserialized.

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;
use validator::Validate;

use crate::errors::AppError;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*[ \t]*\r?\n?(.*?)\s*```\s*$")
        .expect("CODE_FENCE is a valid regex pattern")
});

#[derive(Debug, Error)]
pub enum OutputParseError {
    #[error("model reply contains no JSON object")]
    NoJson,

    #[error("model reply is not valid JSON: {0}")]
    Syntax(serde_json::Error),

    #[error("model reply does not match the expected schema: {0}")]
    Schema(serde_json::Error),

    #[error("model reply failed validation: {0}")]
    Invalid(String),
}

impl OutputParseError {
    /// True when the reply could not be read as JSON at all.
    pub fn is_malformed_json(&self) -> bool {
        matches!(self, OutputParseError::NoJson | OutputParseError::Syntax(_))
    }
}

impl From<OutputParseError> for AppError {
    fn from(err: OutputParseError) -> Self {
        AppError::GenerationError(err.to_string())
    }
}

pub fn strip_code_fences(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str(),
        None => text.trim(),
    }
}

/// The first balanced `{...}` in `text`, skipping braces inside strings.
/// An unterminated object is returned up to the end of the text so the
/// JSON error points at the truncation.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    Some(&text[start..])
}

pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, OutputParseError> {
    let body = strip_code_fences(text);
    let object = extract_json_object(body).ok_or(OutputParseError::NoJson)?;

    serde_json::from_str(object).map_err(|e| match e.classify() {
        Category::Data => OutputParseError::Schema(e),
        Category::Syntax | Category::Eof | Category::Io => OutputParseError::Syntax(e),
    })
}

pub fn parse_validated<T: DeserializeOwned + Validate>(text: &str) -> Result<T, OutputParseError> {
    let value: T = parse_json(text)?;
    value
        .validate()
        .map_err(|e| OutputParseError::Invalid(e.to_string()))?;
    Ok(value)
}

/// Output instructions embedding the JSON schema of `T`.
pub fn format_instructions<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    let schema_json = serde_json::to_string(&schema).unwrap_or_else(|_| "{}".to_string());

    format!(
        "## OUTPUT FORMAT\n\n\
         The output should be formatted as a JSON instance that conforms to the JSON schema below. \
         Return ONLY the JSON object: no markdown code blocks, no text before or after it.\n\n\
         Here is the output schema:\n```\n{}\n```",
        schema_json
    )
}
