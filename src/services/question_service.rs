use std::sync::Arc;

use crate::{
    constants::prompts::{question_type_guidance, QUESTION_GENERATION_PROMPT, QUESTION_SYSTEM_PROMPT},
    errors::AppResult,
    models::{
        domain::{QuestionList, QuestionType},
        dto::request::Difficulty,
    },
    services::{
        document_service::DocumentService,
        model_service::{ChatMessage, ChatModel},
        output_parser::{format_instructions, parse_validated},
    },
};

pub struct QuestionService {
    documents: Arc<DocumentService>,
    model: Arc<dyn ChatModel>,
}

impl QuestionService {
    pub fn new(documents: Arc<DocumentService>, model: Arc<dyn ChatModel>) -> Self {
        Self { documents, model }
    }

    pub async fn generate_questions(
        &self,
        document_id: &str,
        num_questions: u16,
        difficulty: Difficulty,
        question_types: &[QuestionType],
    ) -> AppResult<QuestionList> {
        let document = self.documents.retrieve_text(document_id).await?;

        let guidance = question_types
            .iter()
            .map(|t| question_type_guidance(*t))
            .collect::<Vec<_>>()
            .join("\n");
        let count = num_questions.to_string();
        let instructions = format_instructions::<QuestionList>();
        let prompt = QUESTION_GENERATION_PROMPT.render(&[
            ("num_questions", count.as_str()),
            ("difficulty", difficulty.as_str()),
            ("question_type_guidance", guidance.as_str()),
            ("format_instructions", instructions.as_str()),
            ("document_content", document.text.as_str()),
        ])?;

        log::info!(
            "Generating {} {} questions from {}",
            num_questions,
            difficulty.as_str(),
            document.document_id
        );

        let reply = self
            .model
            .complete(vec![
                ChatMessage::system(QUESTION_SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ])
            .await?;

        let list: QuestionList = parse_validated(&reply).map_err(|e| {
            log::error!("Question output from model was rejected: {}", e);
            e
        })?;

        if let Some(unexpected) = list
            .questions
            .iter()
            .find(|q| !question_types.contains(&q.question_type))
        {
            log::warn!(
                "Model produced unrequested question type {} for question {}",
                unexpected.question_type.as_str(),
                unexpected.number
            );
        }

        Ok(list.into_ordered(num_questions as usize))
    }
}
