use serde::Deserialize;
use validator::Validate;

use crate::models::domain::{GameType, QuestionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Easy", alias = "EASY")]
    Easy,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "Hard", alias = "HARD")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuestionsRequest {
    #[validate(length(min = 1, max = 1024))]
    pub document_id: String,

    #[validate(range(min = 1, max = 50))]
    pub num_questions: u16,

    pub difficulty: Difficulty,

    // Empty means multiple choice only
    #[serde(default)]
    #[validate(length(max = 4))]
    pub question_types: Vec<QuestionType>,
}

impl GenerateQuestionsRequest {
    pub fn requested_types(&self) -> Vec<QuestionType> {
        if self.question_types.is_empty() {
            return vec![QuestionType::MultipleChoice];
        }
        let mut types = Vec::with_capacity(self.question_types.len());
        for question_type in &self.question_types {
            if !types.contains(question_type) {
                types.push(*question_type);
            }
        }
        types
    }
}

fn default_item_count() -> u16 {
    5
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateMiniGameRequest {
    #[validate(length(min = 1, max = 1024))]
    pub document_id: String,

    pub game_type: GameType,

    #[serde(default = "default_item_count")]
    #[validate(range(min = 1, max = 20))]
    pub item_count: u16,
}
