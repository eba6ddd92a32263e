//! Validated quiz structures and the persistence handoff record.
//!
//! A [`QuizDraft`] can only be produced by [`crate::validation::validate`],
//! so holding one means every question passed the schema checks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Number of answer options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Default number of questions a quiz must contain.
pub const DEFAULT_QUESTION_COUNT: usize = 10;

/// A single validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionDraft {
    #[serde(rename = "question_title")]
    question_text: String,
    #[serde(rename = "question_options")]
    options: [String; OPTIONS_PER_QUESTION],
    #[serde(rename = "answer")]
    correct_option: String,
}

impl QuestionDraft {
    /// Callers must have checked that the options are distinct and that
    /// `correct_option` equals one of them.
    pub(crate) fn new(
        question_text: String,
        options: [String; OPTIONS_PER_QUESTION],
        correct_option: String,
    ) -> Self {
        debug_assert!(options.contains(&correct_option));
        Self {
            question_text,
            options,
            correct_option,
        }
    }

    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    pub fn options(&self) -> &[String; OPTIONS_PER_QUESTION] {
        &self.options
    }

    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    /// Position of the correct answer within [`Self::options`].
    pub fn correct_index(&self) -> usize {
        self.options
            .iter()
            .position(|o| *o == self.correct_option)
            .unwrap_or_default()
    }
}

/// A schema-conformant quiz, ready to be handed to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizDraft {
    title: String,
    description: String,
    questions: Vec<QuestionDraft>,
}

impl QuizDraft {
    pub(crate) fn new(title: String, description: String, questions: Vec<QuestionDraft>) -> Self {
        Self {
            title,
            description,
            questions,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Short summary of the video. Empty when the backend did not provide one.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn questions(&self) -> &[QuestionDraft] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// What the persistence layer stores for a generated quiz.
#[derive(Debug, Clone, Serialize)]
pub struct PersistedQuiz {
    pub id: Uuid,
    pub owner: String,
    pub video_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub quiz: QuizDraft,
}

impl PersistedQuiz {
    pub fn new(quiz: QuizDraft, owner: impl Into<String>, video_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            video_url: video_url.into(),
            created_at: Utc::now(),
            quiz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> QuestionDraft {
        QuestionDraft::new(
            "What colour is the sky?".to_string(),
            [
                "Red".to_string(),
                "Blue".to_string(),
                "Green".to_string(),
                "Yellow".to_string(),
            ],
            "Blue".to_string(),
        )
    }

    #[test]
    fn test_correct_index() {
        assert_eq!(sample_question().correct_index(), 1);
    }

    #[test]
    fn test_persisted_quiz_uses_record_field_names() {
        let quiz = QuizDraft::new(
            "Sky".to_string(),
            String::new(),
            vec![sample_question()],
        );
        let record = PersistedQuiz::new(quiz, "alice", "https://youtu.be/dQw4w9WgXcQ");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["owner"], "alice");
        assert_eq!(json["title"], "Sky");
        assert_eq!(json["questions"][0]["question_title"], "What colour is the sky?");
        assert_eq!(json["questions"][0]["question_options"][3], "Yellow");
        assert_eq!(json["questions"][0]["answer"], "Blue");
        assert!(json["created_at"].is_string());
    }
}
