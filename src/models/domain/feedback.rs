use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// One answered question from a quiz attempt. Only `is_correct` is
/// interpreted; every other field is passed to the model untouched.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AttemptAnswer {
    #[serde(default, deserialize_with = "deserialize_correctness")]
    pub is_correct: bool,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// An unanswered question may arrive as `"is_correct": null`.
fn deserialize_correctness<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Validate)]
pub struct AttemptRecord {
    #[serde(default)]
    #[validate(length(max = 500))]
    pub answers: Vec<AttemptAnswer>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttemptSummary {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
}

impl AttemptSummary {
    pub fn from_answers(answers: &[AttemptAnswer]) -> Self {
        let total_questions = answers.len();
        let correct_answers = answers.iter().filter(|a| a.is_correct).count();
        let accuracy = if total_questions > 0 {
            correct_answers as f64 / total_questions as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_questions,
            correct_answers,
            accuracy,
        }
    }

    /// Accuracy with one decimal place, as shown to students.
    pub fn accuracy_label(&self) -> String {
        format!("{:.1}", self.accuracy)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct QuestionFeedback {
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub concept_explanation: String,
    #[serde(default)]
    pub study_tip: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Feedback {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: String,
    /// Keyed by the question id the caller supplied.
    pub question_feedback: BTreeMap<String, QuestionFeedback>,
}

impl Feedback {
    /// Used when the model answered but not with parseable JSON.
    pub fn accuracy_fallback(summary: &AttemptSummary) -> Self {
        let accuracy = summary.accuracy_label();
        Self {
            strengths: vec![
                format!("Completed the quiz with {}% accuracy", accuracy),
                "Demonstrated effort in attempting all questions".to_string(),
            ],
            weaknesses: vec![
                "Review the material covered in this quiz".to_string(),
                "Practice more questions to improve understanding".to_string(),
            ],
            recommendations: format!(
                "You scored {}% on this quiz. Focus on reviewing the topics where you made mistakes. \
                 Consider re-reading the course materials and practicing similar problems. \
                 Keep practicing - each attempt helps you improve!",
                accuracy
            ),
            question_feedback: BTreeMap::new(),
        }
    }

    /// Used for every other failure.
    pub fn minimal_fallback() -> Self {
        Self {
            strengths: vec!["Completed the quiz".to_string()],
            weaknesses: vec!["Review the material".to_string()],
            recommendations: "Keep practicing to improve your understanding.".to_string(),
            question_feedback: BTreeMap::new(),
        }
    }
}
