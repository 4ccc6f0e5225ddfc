use std::env;
use secrecy::SecretString;

use crate::services::blob_storage::DEFAULT_MAX_BLOB_BYTES;

const DEFAULT_CONNECTION_STRING: &str = "UseDevelopmentStorage=true";
const DEFAULT_OPENAI_KEY: &str = "azure_openai_api_key";

#[derive(Clone, Debug)]
pub struct Config {
    pub storage_connection_string: SecretString,
    pub storage_container_name: String,
    pub document_prefix: String,
    pub max_document_chars: usize,
    pub max_document_bytes: u64,
    pub openai_endpoint: String,
    pub openai_api_key: SecretString,
    pub openai_deployment: String,
    pub openai_api_version: String,
    pub openai_temperature: f32,
    pub web_server_host: String,
    pub web_server_port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            storage_connection_string: SecretString::from(
                env::var("AZURE_STORAGE_CONNECTION_STRING")
                    .unwrap_or_else(|_| DEFAULT_CONNECTION_STRING.to_string()),
            ),
            storage_container_name: env::var("AZURE_STORAGE_CONTAINER_NAME")
                .unwrap_or_else(|_| "study-materials".to_string()),
            document_prefix: env::var("DOCUMENT_PREFIX")
                .unwrap_or_else(|_| "documents/".to_string()),
            max_document_chars: env::var("MAX_DOCUMENT_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100_000),
            max_document_bytes: env::var("MAX_DOCUMENT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BLOB_BYTES),
            openai_endpoint: env::var("AZURE_OPENAI_ENDPOINT")
                .unwrap_or_else(|_| "https://localhost.openai.azure.com".to_string()),
            openai_api_key: SecretString::from(
                env::var("AZURE_OPENAI_API_KEY").unwrap_or_else(|_| DEFAULT_OPENAI_KEY.to_string()),
            ),
            openai_deployment: env::var("AZURE_OPENAI_DEPLOYMENT_NAME")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_version: env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| "2024-06-01".to_string()),
            openai_temperature: env::var("AZURE_OPENAI_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.7),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        if self.openai_api_key.expose_secret() == DEFAULT_OPENAI_KEY {
            panic!(
                "FATAL: AZURE_OPENAI_API_KEY is using default value! Set AZURE_OPENAI_API_KEY environment variable."
            );
        }

        if self.storage_connection_string.expose_secret() == DEFAULT_CONNECTION_STRING {
            panic!(
                "FATAL: AZURE_STORAGE_CONNECTION_STRING points at development storage! Set AZURE_STORAGE_CONNECTION_STRING environment variable."
            );
        }

        if !(0.0..=2.0).contains(&self.openai_temperature) {
            panic!(
                "FATAL: AZURE_OPENAI_TEMPERATURE must be between 0.0 and 2.0, got {}",
                self.openai_temperature
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            storage_connection_string: SecretString::from(DEFAULT_CONNECTION_STRING.to_string()),
            storage_container_name: "test-container".to_string(),
            document_prefix: "documents/".to_string(),
            max_document_chars: 1_000,
            max_document_bytes: 1024 * 1024,
            openai_endpoint: "https://example.openai.azure.com".to_string(),
            openai_api_key: SecretString::from("test-key".to_string()),
            openai_deployment: "test-deployment".to_string(),
            openai_api_version: "2024-06-01".to_string(),
            openai_temperature: 0.0,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 5000,
        }
    }
}
