use crate::models::domain::{GameType, QuestionType};
use crate::services::prompt_template::PromptTemplate;

pub const QUESTION_SYSTEM_PROMPT: &str = "You are a helpful learning assistant for students. Your goal is to facilitate their learning by testing their understanding of the content from a lecture note.";

pub const QUESTION_GENERATION_PROMPT: PromptTemplate = PromptTemplate::new(
    r#"Based on the provided lecture document, generate {num_questions} questions. Ensure that these questions are of {difficulty} difficulty.

## QUESTION TYPES

Use only the following question types, spreading the questions across them:

{question_type_guidance}

## ANSWER REQUIREMENTS

- Number the questions sequentially starting from 1
- Every answer carries an indication whether it is a correct answer and a reason that justifies why it is correct or incorrect
- The possible answers do not have to come solely from the content of the document. You may also generate other plausible answers depending on the difficulty level
- Add a short hint to a question when it helps a student who is stuck, without giving the answer away

{format_instructions}

Below is the content of the lecture document:

{document_content}"#,
);

pub const FEEDBACK_SYSTEM_PROMPT: &str = "You are an educational AI tutor. Analyze this student's quiz attempt and provide detailed, constructive, and encouraging feedback.";

pub const FEEDBACK_PROMPT: PromptTemplate = PromptTemplate::new(
    r#"## STUDENT PERFORMANCE SUMMARY

- Total Questions: {total_questions}
- Correct Answers: {correct_answers}
- Accuracy: {accuracy}%

## DETAILED ANSWERS

{attempt_data}

## OUTPUT FORMAT

Provide feedback in the following JSON format (return ONLY valid JSON, no markdown, no extra text):
{{
    "strengths": [
        "Specific strength based on correct answers (e.g., Strong understanding of Python Lists)",
        "Another specific strength (e.g., Correctly applied concepts in scenario-based questions)"
    ],
    "weaknesses": [
        "Specific area needing improvement (e.g., Struggles with algorithm complexity analysis)",
        "Another weakness (e.g., Needs practice with code debugging)"
    ],
    "recommendations": "A detailed paragraph (3-5 sentences) with actionable study recommendations. Be specific about topics to review, resources to use, and practice activities.",
    "question_feedback": {{
        "question_id_1": {{
            "feedback": "Specific feedback explaining why the answer was correct/incorrect",
            "concept_explanation": "Clear explanation of the underlying concept",
            "study_tip": "Actionable tip for improvement on this topic"
        }}
    }}
}}

## GUIDELINES

1. Focus on Bloom's taxonomy levels where the student struggled
2. Identify specific topics/concepts needing review
3. Use an encouraging, supportive tone - emphasize growth mindset
4. Provide actionable, concrete steps for improvement
5. Address common misconceptions if detected
6. For correct answers, reinforce why they were correct
7. For incorrect answers, explain the mistake and how to avoid it
8. Key question_feedback by the question identifiers found in the detailed answers
9. Return ONLY the JSON object, no additional text before or after"#,
);

pub const MINI_GAME_SYSTEM_PROMPT: &str = "You are a playful study companion. You turn lecture material into short bonus games that help students remember key terms and facts.";

pub const MINI_GAME_PROMPT: PromptTemplate = PromptTemplate::new(
    r#"Create a {game_type} game with {item_count} items from the lecture document below.

## GAME RULES

{game_rules}

## ACCURACY REQUIREMENTS

- Every term, definition and sentence must be supported by the document
- Prefer the most important concepts over trivia
- Keep titles short and instructions to one or two sentences

{format_instructions}

Below is the content of the lecture document:

{document_content}"#,
);

/// How each question type should look, spliced into the question prompt.
pub fn question_type_guidance(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::MultipleChoice => "- multiple_choice: a list of 4 answers. This is a multi select question and there can be more than one correct answer. Leave payload empty.",
        QuestionType::TrueFalse => "- true_false: a statement with exactly 2 answers, \"True\" and \"False\", exactly one of them correct. Leave payload empty.",
        QuestionType::Matching => "- matching: a payload of kind \"matching\" with at least 3 pairs, each pairing a term (left) with its match (right). Every left value is unique. Answers may be empty.",
        QuestionType::Categorization => "- categorization: a payload of kind \"categorization\" with 2 to 4 categories, each listing the items that belong to it. No item may appear in more than one category. Answers may be empty.",
    }
}

pub fn game_rules(game_type: GameType) -> &'static str {
    match game_type {
        GameType::WordScramble => "- Pick key terms from the document\n- \"scrambled\" uses exactly the letters of \"word\" in a different order\n- The hint describes the term without using it",
        GameType::MemoryMatch => "- Each pair joins a term with its short definition\n- Terms are unique\n- Definitions are at most 15 words",
        GameType::FillInTheBlank => "- Each sentence states a fact from the document with the key term replaced by ____ (exactly one blank)\n- \"answer\" is the removed term\n- Give 3 plausible distractors that are not the answer",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_prompt_declares_expected_variables() {
        assert_eq!(
            QUESTION_GENERATION_PROMPT.variables(),
            vec![
                "num_questions",
                "difficulty",
                "question_type_guidance",
                "format_instructions",
                "document_content"
            ]
        );
    }

    #[test]
    fn feedback_prompt_renders_literal_json_example() {
        let rendered = FEEDBACK_PROMPT
            .render(&[
                ("total_questions", "4"),
                ("correct_answers", "3"),
                ("accuracy", "75.0"),
                ("attempt_data", "[]"),
            ])
            .unwrap();

        assert!(rendered.contains("- Accuracy: 75.0%"));
        assert!(rendered.contains("\"question_feedback\": {\n"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn mini_game_prompt_declares_expected_variables() {
        assert_eq!(
            MINI_GAME_PROMPT.variables(),
            vec![
                "game_type",
                "item_count",
                "game_rules",
                "format_instructions",
                "document_content"
            ]
        );
    }

    #[test]
    fn guidance_names_each_type() {
        for question_type in [
            QuestionType::MultipleChoice,
            QuestionType::TrueFalse,
            QuestionType::Matching,
            QuestionType::Categorization,
        ] {
            assert!(question_type_guidance(question_type).starts_with(&format!("- {}:", question_type.as_str())));
        }
        assert!(game_rules(GameType::FillInTheBlank).contains("____"));
    }
}
