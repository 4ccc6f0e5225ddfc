use std::sync::Arc;

use crate::{
    constants::prompts::{FEEDBACK_PROMPT, FEEDBACK_SYSTEM_PROMPT},
    errors::AppResult,
    models::domain::{AttemptRecord, AttemptSummary, Feedback},
    services::{
        model_service::{ChatMessage, ChatModel},
        output_parser::{parse_json, OutputParseError},
    },
};

pub struct FeedbackService {
    model: Arc<dyn ChatModel>,
}

enum FeedbackFailure {
    MalformedJson(OutputParseError),
    Other(String),
}

impl FeedbackService {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Never fails on model problems: a static fallback is returned instead.
    pub async fn generate_feedback(&self, attempt: &AttemptRecord) -> Feedback {
        let summary = AttemptSummary::from_answers(&attempt.answers);

        match self.request_feedback(attempt, &summary).await {
            Ok(feedback) => {
                log::info!(
                    "Generated feedback for attempt with {} answers",
                    summary.total_questions
                );
                feedback
            }
            Err(FeedbackFailure::MalformedJson(e)) => {
                log::error!("Feedback JSON parsing failed: {}", e);
                Feedback::accuracy_fallback(&summary)
            }
            Err(FeedbackFailure::Other(message)) => {
                log::error!("Feedback generation failed: {}", message);
                Feedback::minimal_fallback()
            }
        }
    }

    async fn request_feedback(
        &self,
        attempt: &AttemptRecord,
        summary: &AttemptSummary,
    ) -> Result<Feedback, FeedbackFailure> {
        let prompt = self
            .render_prompt(attempt, summary)
            .map_err(|e| FeedbackFailure::Other(e.to_string()))?;

        let reply = self
            .model
            .complete(vec![
                ChatMessage::system(FEEDBACK_SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ])
            .await
            .map_err(|e| FeedbackFailure::Other(e.to_string()))?;

        parse_json::<Feedback>(&reply).map_err(|e| {
            if e.is_malformed_json() {
                FeedbackFailure::MalformedJson(e)
            } else {
                FeedbackFailure::Other(e.to_string())
            }
        })
    }

    fn render_prompt(&self, attempt: &AttemptRecord, summary: &AttemptSummary) -> AppResult<String> {
        let attempt_data = serde_json::to_string_pretty(&attempt.answers)?;
        let total = summary.total_questions.to_string();
        let correct = summary.correct_answers.to_string();
        let accuracy = summary.accuracy_label();

        FEEDBACK_PROMPT.render(&[
            ("total_questions", total.as_str()),
            ("correct_answers", correct.as_str()),
            ("accuracy", accuracy.as_str()),
            ("attempt_data", attempt_data.as_str()),
        ])
    }
}
