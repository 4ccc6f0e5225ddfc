use std::borrow::Cow;
use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema, Validate)]
pub struct Answer {
    /// The answer text.
    #[validate(length(min = 1))]
    pub text: String,
    /// Whether the answer is correct for the question.
    pub is_correct: bool,
    /// Why this answer is correct or incorrect.
    #[serde(default, alias = "justification", alias = "explanation")]
    pub reason: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    MultipleChoice, // One or more correct answers
    TrueFalse,      // Two answers, one correct
    Matching,       // Pairs carried in the payload
    Categorization, // Groupings carried in the payload
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Matching => "matching",
            QuestionType::Categorization => "categorization",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct MatchingPair {
    pub left: String,
    pub right: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct CategoryGroup {
    pub name: String,
    pub items: Vec<String>,
}

/// Structured data for question types that are not answered by picking
/// from a list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionPayload {
    Matching { pairs: Vec<MatchingPair> },
    Categorization { categories: Vec<CategoryGroup> },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema, Validate)]
#[validate(schema(function = "validate_question_shape"))]
pub struct Question {
    /// The question number. Starting from 1.
    #[serde(deserialize_with = "deserialize_ordinal")]
    #[schemars(with = "u32")]
    #[validate(range(min = 1))]
    pub number: u32,
    /// The question text.
    #[validate(length(min = 1))]
    pub text: String,
    /// Optional nudge shown before answering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, alias = "type")]
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<QuestionPayload>,
    /// The list of answers for the question.
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<Answer>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema, Validate)]
#[validate(schema(function = "validate_unique_numbers"))]
pub struct QuestionList {
    /// The list of questions.
    #[validate(length(min = 1), nested)]
    pub questions: Vec<Question>,
}

impl QuestionList {
    /// Orders questions by number and drops anything past `limit`.
    pub fn into_ordered(mut self, limit: usize) -> Self {
        self.questions.sort_by_key(|q| q.number);
        if self.questions.len() > limit {
            log::warn!(
                "Model returned {} questions, keeping the first {}",
                self.questions.len(),
                limit
            );
            self.questions.truncate(limit);
        } else if self.questions.len() < limit {
            log::warn!(
                "Model returned {} questions, {} were requested",
                self.questions.len(),
                limit
            );
        }
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Ordinal {
    Number(u32),
    Text(String),
}

fn deserialize_ordinal<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Ordinal::deserialize(deserializer)? {
        Ordinal::Number(n) => Ok(n),
        Ordinal::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("question number '{}' is not an integer", s))),
    }
}

fn shape_error(message: String) -> ValidationError {
    ValidationError::new("question_shape").with_message(Cow::Owned(message))
}

fn validate_question_shape(question: &Question) -> Result<(), ValidationError> {
    let n = question.number;
    if question.text.trim().is_empty() {
        return Err(shape_error(format!("question {} has empty text", n)));
    }

    let correct = question.answers.iter().filter(|a| a.is_correct).count();

    match (question.question_type, &question.payload) {
        (QuestionType::MultipleChoice, None) => {
            if question.answers.len() < 2 {
                return Err(shape_error(format!(
                    "multiple choice question {} needs at least 2 answers",
                    n
                )));
            }
            if correct == 0 {
                return Err(shape_error(format!(
                    "multiple choice question {} has no correct answer",
                    n
                )));
            }
        }
        (QuestionType::TrueFalse, None) => {
            if question.answers.len() != 2 || correct != 1 {
                return Err(shape_error(format!(
                    "true/false question {} needs exactly 2 answers with 1 correct",
                    n
                )));
            }
        }
        (QuestionType::Matching, Some(QuestionPayload::Matching { pairs })) => {
            if pairs.len() < 2 {
                return Err(shape_error(format!("matching question {} needs at least 2 pairs", n)));
            }
            let mut seen = HashSet::new();
            for pair in pairs {
                let left = pair.left.trim().to_lowercase();
                if left.is_empty() || pair.right.trim().is_empty() {
                    return Err(shape_error(format!("matching question {} has an empty pair", n)));
                }
                if !seen.insert(left) {
                    return Err(shape_error(format!(
                        "matching question {} repeats '{}'",
                        n, pair.left
                    )));
                }
            }
        }
        (QuestionType::Categorization, Some(QuestionPayload::Categorization { categories })) => {
            if categories.len() < 2 {
                return Err(shape_error(format!(
                    "categorization question {} needs at least 2 categories",
                    n
                )));
            }
            let mut names = HashSet::new();
            let mut items = HashSet::new();
            for category in categories {
                if !names.insert(category.name.trim().to_lowercase()) {
                    return Err(shape_error(format!(
                        "categorization question {} repeats category '{}'",
                        n, category.name
                    )));
                }
                if category.items.is_empty() {
                    return Err(shape_error(format!(
                        "category '{}' in question {} has no items",
                        category.name, n
                    )));
                }
                for item in &category.items {
                    if !items.insert(item.trim().to_lowercase()) {
                        return Err(shape_error(format!(
                            "item '{}' appears in more than one category in question {}",
                            item, n
                        )));
                    }
                }
            }
        }
        (question_type, payload) => {
            return Err(shape_error(format!(
                "question {} of type {} has {} payload",
                n,
                question_type.as_str(),
                match payload {
                    None => "no",
                    Some(QuestionPayload::Matching { .. }) => "a matching",
                    Some(QuestionPayload::Categorization { .. }) => "a categorization",
                }
            )));
        }
    }

    Ok(())
}

fn validate_unique_numbers(list: &QuestionList) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for question in &list.questions {
        if !seen.insert(question.number) {
            return Err(ValidationError::new("duplicate_number").with_message(Cow::Owned(
                format!("question number {} is used more than once", question.number),
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(text: &str, is_correct: bool) -> Answer {
        Answer {
            text: text.to_string(),
            is_correct,
            reason: format!("because {}", text),
        }
    }

    fn multiple_choice(number: u32) -> Question {
        Question {
            number,
            text: "Which databases are relational?".to_string(),
            hint: None,
            question_type: QuestionType::MultipleChoice,
            payload: None,
            answers: vec![
                answer("PostgreSQL", true),
                answer("MySQL", true),
                answer("Redis", false),
                answer("MongoDB", false),
            ],
        }
    }

    #[test]
    fn number_accepts_integer_or_numeric_string() {
        let from_int: Question = serde_json::from_value(json!({
            "number": 3, "text": "Q", "answers": []
        }))
        .unwrap();
        let from_str: Question = serde_json::from_value(json!({
            "number": " 4 ", "text": "Q", "answers": []
        }))
        .unwrap();

        assert_eq!(from_int.number, 3);
        assert_eq!(from_str.number, 4);
        assert_eq!(from_int.question_type, QuestionType::MultipleChoice);
    }

    #[test]
    fn number_rejects_non_numeric_text() {
        let parsed = serde_json::from_value::<Question>(json!({
            "number": "one", "text": "Q", "answers": []
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn answer_reason_accepts_aliases() {
        let parsed: Answer = serde_json::from_value(json!({
            "text": "Paris", "is_correct": true, "justification": "Capital of France"
        }))
        .unwrap();
        assert_eq!(parsed.reason, "Capital of France");
    }

    #[test]
    fn multiple_choice_requires_a_correct_answer() {
        let mut question = multiple_choice(1);
        assert!(question.validate().is_ok());

        question.answers.iter_mut().for_each(|a| a.is_correct = false);
        assert!(question.validate().is_err());

        question.answers.truncate(1);
        question.answers[0].is_correct = true;
        assert!(question.validate().is_err());
    }

    #[test]
    fn true_false_needs_exactly_one_correct_of_two() {
        let mut question = Question {
            question_type: QuestionType::TrueFalse,
            answers: vec![answer("True", true), answer("False", false)],
            ..multiple_choice(1)
        };
        assert!(question.validate().is_ok());

        question.answers[1].is_correct = true;
        assert!(question.validate().is_err());
    }

    #[test]
    fn matching_requires_unique_pairs() {
        let mut question = Question {
            question_type: QuestionType::Matching,
            answers: vec![],
            payload: Some(QuestionPayload::Matching {
                pairs: vec![
                    MatchingPair { left: "SQL".into(), right: "Relational".into() },
                    MatchingPair { left: "Redis".into(), right: "Key-value".into() },
                ],
            }),
            ..multiple_choice(2)
        };
        assert!(question.validate().is_ok());

        if let Some(QuestionPayload::Matching { pairs }) = &mut question.payload {
            pairs[1].left = "sql".into();
        }
        assert!(question.validate().is_err());
    }

    #[test]
    fn categorization_rejects_items_in_two_groups() {
        let mut question = Question {
            question_type: QuestionType::Categorization,
            answers: vec![],
            payload: Some(QuestionPayload::Categorization {
                categories: vec![
                    CategoryGroup { name: "SQL".into(), items: vec!["MySQL".into()] },
                    CategoryGroup { name: "NoSQL".into(), items: vec!["Cassandra".into()] },
                ],
            }),
            ..multiple_choice(1)
        };
        assert!(question.validate().is_ok());

        if let Some(QuestionPayload::Categorization { categories }) = &mut question.payload {
            categories[1].items.push("mysql".into());
        }
        assert!(question.validate().is_err());
    }

    fn matching(pairs: &[(&str, &str)]) -> Question {
        Question {
            question_type: QuestionType::Matching,
            answers: vec![],
            payload: Some(QuestionPayload::Matching {
                pairs: pairs
                    .iter()
                    .map(|(left, right)| MatchingPair { left: left.to_string(), right: right.to_string() })
                    .collect(),
            }),
            ..multiple_choice(1)
        }
    }

    fn categorization(categories: &[(&str, Vec<&str>)]) -> Question {
        Question {
            question_type: QuestionType::Categorization,
            answers: vec![],
            payload: Some(QuestionPayload::Categorization {
                categories: categories
                    .iter()
                    .map(|(name, items)| CategoryGroup {
                        name: name.to_string(),
                        items: items.iter().map(|i| i.to_string()).collect(),
                    })
                    .collect(),
            }),
            ..multiple_choice(1)
        }
    }

    #[test]
    fn matching_needs_two_pairs() {
        let err = matching(&[("SQL", "Relational")]).validate().unwrap_err();
        assert!(err.to_string().contains("needs at least 2 pairs"));
    }

    #[test]
    fn matching_rejects_empty_left() {
        let err = matching(&[("SQL", "Relational"), ("  ", "Key-value")])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("has an empty pair"));
    }

    #[test]
    fn categorization_needs_two_categories() {
        let err = categorization(&[("SQL", vec!["MySQL"])]).validate().unwrap_err();
        assert!(err.to_string().contains("needs at least 2 categories"));
    }

    #[test]
    fn categorization_rejects_empty_category() {
        let err = categorization(&[("SQL", vec!["MySQL"]), ("NoSQL", vec![])])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("has no items"));
    }

    #[test]
    fn categorization_rejects_repeated_category_name() {
        let err = categorization(&[("SQL", vec!["MySQL"]), ("sql ", vec!["Oracle"])])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("repeats category"));
    }

    #[test]
    fn payload_must_match_question_type() {
        let question = Question {
            question_type: QuestionType::Matching,
            payload: None,
            ..multiple_choice(1)
        };
        let err = question.validate().unwrap_err();
        assert!(err.to_string().contains("no payload"));

        let question = Question {
            payload: Some(QuestionPayload::Matching { pairs: vec![] }),
            ..multiple_choice(1)
        };
        assert!(question.validate().is_err());
    }

    #[test]
    fn question_list_rejects_duplicates_and_empty() {
        let list = QuestionList { questions: vec![multiple_choice(1), multiple_choice(1)] };
        assert!(list.validate().is_err());

        let list = QuestionList { questions: vec![] };
        assert!(list.validate().is_err());
    }

    #[test]
    fn into_ordered_sorts_and_truncates() {
        let list = QuestionList {
            questions: vec![multiple_choice(3), multiple_choice(1), multiple_choice(2)],
        };

        let ordered = list.into_ordered(2);
        let numbers: Vec<u32> = ordered.questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn payload_serializes_with_kind_tag() {
        let payload = QuestionPayload::Categorization {
            categories: vec![CategoryGroup { name: "A".into(), items: vec!["x".into()] }],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["kind"], "categorization");
        assert_eq!(value["categories"][0]["items"][0], "x");
    }
}
