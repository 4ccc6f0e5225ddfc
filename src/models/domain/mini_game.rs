use std::borrow::Cow;
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A run of three or more underscores marks the blank in a sentence.
static BLANK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{3,}").expect("BLANK is a valid regex pattern"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    WordScramble,
    MemoryMatch,
    FillInTheBlank,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::WordScramble => "word_scramble",
            GameType::MemoryMatch => "memory_match",
            GameType::FillInTheBlank => "fill_in_the_blank",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema, Validate)]
#[validate(schema(function = "validate_scramble"))]
pub struct ScrambledWord {
    /// The key term from the document.
    #[validate(length(min = 2))]
    pub word: String,
    /// The same letters in a different order.
    pub scrambled: String,
    /// A short clue that does not contain the word.
    #[serde(default)]
    pub hint: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema, Validate)]
pub struct MemoryPair {
    #[validate(length(min = 1))]
    pub term: String,
    #[validate(length(min = 1))]
    pub definition: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema, Validate)]
#[validate(schema(function = "validate_blank"))]
pub struct BlankSentence {
    /// Sentence with the missing term replaced by "____".
    pub sentence: String,
    #[validate(length(min = 1))]
    pub answer: String,
    /// Plausible wrong options.
    #[serde(default)]
    pub distractors: Vec<String>,
}

/// A short bonus game built from the document.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "game_type", rename_all = "snake_case")]
pub enum MiniGame {
    WordScramble {
        title: String,
        instructions: String,
        items: Vec<ScrambledWord>,
    },
    MemoryMatch {
        title: String,
        instructions: String,
        pairs: Vec<MemoryPair>,
    },
    FillInTheBlank {
        title: String,
        instructions: String,
        items: Vec<BlankSentence>,
    },
}

impl MiniGame {
    pub fn game_type(&self) -> GameType {
        match self {
            MiniGame::WordScramble { .. } => GameType::WordScramble,
            MiniGame::MemoryMatch { .. } => GameType::MemoryMatch,
            MiniGame::FillInTheBlank { .. } => GameType::FillInTheBlank,
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            MiniGame::WordScramble { items, .. } => items.len(),
            MiniGame::MemoryMatch { pairs, .. } => pairs.len(),
            MiniGame::FillInTheBlank { items, .. } => items.len(),
        }
    }

    pub fn truncate(&mut self, limit: usize) {
        match self {
            MiniGame::WordScramble { items, .. } => items.truncate(limit),
            MiniGame::MemoryMatch { pairs, .. } => pairs.truncate(limit),
            MiniGame::FillInTheBlank { items, .. } => items.truncate(limit),
        }
    }

    /// Checks every item and the per-game rules.
    pub fn check(&self) -> Result<(), String> {
        match self {
            MiniGame::WordScramble { items, .. } => {
                require_items(items.len())?;
                for item in items {
                    item.validate().map_err(|e| e.to_string())?;
                }
            }
            MiniGame::MemoryMatch { pairs, .. } => {
                if pairs.len() < 2 {
                    return Err("memory match needs at least 2 pairs".to_string());
                }
                let mut terms = HashSet::new();
                for pair in pairs {
                    pair.validate().map_err(|e| e.to_string())?;
                    if !terms.insert(pair.term.trim().to_lowercase()) {
                        return Err(format!("memory match repeats term '{}'", pair.term));
                    }
                }
            }
            MiniGame::FillInTheBlank { items, .. } => {
                require_items(items.len())?;
                for item in items {
                    item.validate().map_err(|e| e.to_string())?;
                }
            }
        }
        Ok(())
    }
}

fn require_items(count: usize) -> Result<(), String> {
    if count == 0 {
        Err("game has no items".to_string())
    } else {
        Ok(())
    }
}

/// Lowercased characters with whitespace removed.
fn normalized(word: &str) -> Vec<char> {
    word.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn letters(word: &str) -> Vec<char> {
    let mut letters = normalized(word);
    letters.sort_unstable();
    letters
}

fn validate_scramble(item: &ScrambledWord) -> Result<(), ValidationError> {
    let error = |message: String| {
        ValidationError::new("scramble").with_message(Cow::Owned(message))
    };

    if letters(&item.word) != letters(&item.scrambled) {
        return Err(error(format!(
            "'{}' is not a rearrangement of '{}'",
            item.scrambled, item.word
        )));
    }

    let distinct: HashSet<char> = letters(&item.word).into_iter().collect();
    let unchanged = normalized(&item.scrambled) == normalized(&item.word);
    if distinct.len() > 1 && unchanged {
        return Err(error(format!("'{}' is not scrambled", item.word)));
    }
    Ok(())
}

fn validate_blank(item: &BlankSentence) -> Result<(), ValidationError> {
    let error = |message: String| ValidationError::new("blank").with_message(Cow::Owned(message));

    let blanks = BLANK.find_iter(&item.sentence).count();
    if blanks != 1 {
        return Err(error(format!(
            "sentence must contain exactly one blank, found {}: '{}'",
            blanks, item.sentence
        )));
    }

    let answer = item.answer.trim().to_lowercase();
    if item
        .distractors
        .iter()
        .any(|d| d.trim().to_lowercase() == answer)
    {
        return Err(error(format!("answer '{}' is listed as a distractor", item.answer)));
    }
    Ok(())
}
