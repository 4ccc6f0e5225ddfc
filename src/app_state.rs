use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::{
    config::Config,
    errors::AppResult,
    services::{
        blob_storage::{AzureBlobStore, BlobStore},
        document_service::DocumentService,
        feedback_service::FeedbackService,
        mini_game_service::MiniGameService,
        model_service::{AzureChatModel, ChatModel},
        question_service::QuestionService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub question_service: Arc<QuestionService>,
    pub feedback_service: Arc<FeedbackService>,
    pub mini_game_service: Arc<MiniGameService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let store = Arc::new(AzureBlobStore::from_connection_string(
            config.storage_connection_string.expose_secret(),
            &config.storage_container_name,
        )?
        .with_max_bytes(config.max_document_bytes));
        let model = Arc::new(AzureChatModel::new(&config));

        log::info!(
            "Serving documents from container {} via deployment {}",
            config.storage_container_name,
            config.openai_deployment
        );

        Ok(Self::with_services(store, model, config))
    }

    /// Wires the services over an arbitrary store and model.
    pub fn with_services(
        store: Arc<dyn BlobStore>,
        model: Arc<dyn ChatModel>,
        config: Config,
    ) -> Self {
        let documents = Arc::new(DocumentService::new(
            store,
            config.document_prefix.clone(),
            config.max_document_chars,
        ));

        Self {
            question_service: Arc::new(QuestionService::new(documents.clone(), model.clone())),
            feedback_service: Arc::new(FeedbackService::new(model.clone())),
            mini_game_service: Arc::new(MiniGameService::new(documents, model)),
            config: Arc::new(config),
        }
    }
}
