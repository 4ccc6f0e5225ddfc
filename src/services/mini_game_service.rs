use std::sync::Arc;

use crate::{
    constants::prompts::{game_rules, MINI_GAME_PROMPT, MINI_GAME_SYSTEM_PROMPT},
    errors::{AppError, AppResult},
    models::domain::{GameType, MiniGame},
    services::{
        document_service::DocumentService,
        model_service::{ChatMessage, ChatModel},
        output_parser::{format_instructions, parse_json},
    },
};

pub struct MiniGameService {
    documents: Arc<DocumentService>,
    model: Arc<dyn ChatModel>,
}

impl MiniGameService {
    pub fn new(documents: Arc<DocumentService>, model: Arc<dyn ChatModel>) -> Self {
        Self { documents, model }
    }

    pub async fn generate_mini_game(
        &self,
        document_id: &str,
        game_type: GameType,
        item_count: u16,
    ) -> AppResult<MiniGame> {
        let document = self.documents.retrieve_text(document_id).await?;

        let count = item_count.to_string();
        let instructions = format_instructions::<MiniGame>();
        let prompt = MINI_GAME_PROMPT.render(&[
            ("game_type", game_type.as_str()),
            ("item_count", count.as_str()),
            ("game_rules", game_rules(game_type)),
            ("format_instructions", instructions.as_str()),
            ("document_content", document.text.as_str()),
        ])?;

        log::info!(
            "Generating {} game with {} items from {}",
            game_type.as_str(),
            item_count,
            document.document_id
        );

        let reply = self
            .model
            .complete(vec![
                ChatMessage::system(MINI_GAME_SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ])
            .await?;

        let mut game: MiniGame = parse_json(&reply).map_err(|e| {
            log::error!("Mini-game output from model was rejected: {}", e);
            e
        })?;

        if game.game_type() != game_type {
            return Err(AppError::GenerationError(format!(
                "model produced a {} game instead of {}",
                game.game_type().as_str(),
                game_type.as_str()
            )));
        }

        game.check()
            .map_err(|e| AppError::GenerationError(format!("model reply failed validation: {}", e)))?;

        if game.item_count() > item_count as usize {
            log::warn!(
                "Model produced {} items, keeping the first {}",
                game.item_count(),
                item_count
            );
            game.truncate(item_count as usize);
        }

        Ok(game)
    }
}
