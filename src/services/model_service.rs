use async_openai::{config::AzureConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A hosted chat-completion model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the text of the first choice.
    async fn complete(&self, messages: Vec<ChatMessage>) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

pub struct AzureChatModel {
    client: Client<AzureConfig>,
    deployment: String,
    temperature: f32,
}

impl AzureChatModel {
    pub fn new(config: &Config) -> Self {
        let azure = AzureConfig::new()
            .with_api_base(config.openai_endpoint.trim_end_matches('/'))
            .with_api_version(&config.openai_api_version)
            .with_deployment_id(&config.openai_deployment)
            .with_api_key(config.openai_api_key.expose_secret());

        Self {
            client: Client::with_config(azure),
            deployment: config.openai_deployment.clone(),
            temperature: config.openai_temperature,
        }
    }
}

#[async_trait]
impl ChatModel for AzureChatModel {
    async fn complete(&self, messages: Vec<ChatMessage>) -> AppResult<String> {
        log::debug!(
            "Sending {} messages to deployment {}",
            messages.len(),
            self.deployment
        );

        let request = json!({
            "messages": messages,
            "temperature": self.temperature,
        });

        let response: CompletionResponse = self.client.chat().create_byot(request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::GenerationError("model returned no choices".to_string()))?;

        if choice.finish_reason.as_deref() == Some("length") {
            log::warn!("Model reply from {} was cut off at the token limit", self.deployment);
        }

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(AppError::GenerationError(
                "model returned an empty reply".to_string(),
            )),
        }
    }
}
