use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category label used for survey questions that do not name one.
pub const DEFAULT_CATEGORY: &str = "General";

/// A single quiz question as supplied by the question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(alias = "prompt", alias = "text")]
    pub question: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Question {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

/// The two shapes a quiz can take, picked by which optional fields the
/// questions carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKind {
    /// Every question has a correct answer; completion yields a score.
    Scored,
    /// No question has a correct answer; completion groups answers by category.
    Categorized,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("a quiz needs at least one question")]
    Empty,

    #[error("question #{index} has a blank id")]
    BlankId { index: usize },

    #[error("duplicate question id '{id}'")]
    DuplicateId { id: String },

    #[error("question '{id}' has no options")]
    NoOptions { id: String },

    #[error("question '{id}' has a blank option")]
    BlankOption { id: String },

    #[error("correct answer '{answer}' of question '{id}' is not one of its options")]
    CorrectAnswerNotAnOption { id: String, answer: String },

    #[error("questions mix scored and categorized shapes")]
    MixedKinds,
}

/// A validated, immutable, non-empty question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    questions: Vec<Question>,
    kind: QuizKind,
}

impl Quiz {
    /// Validates the question list.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` when the list is empty, ids are blank or repeated,
    /// options are missing or blank, a correct answer is not an option, or
    /// scored and categorized questions are mixed.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, question) in questions.iter().enumerate() {
            if question.id.trim().is_empty() {
                return Err(QuizError::BlankId { index: index + 1 });
            }
            if !seen.insert(question.id.as_str()) {
                return Err(QuizError::DuplicateId {
                    id: question.id.clone(),
                });
            }
            if question.options.is_empty() {
                return Err(QuizError::NoOptions {
                    id: question.id.clone(),
                });
            }
            if question.options.iter().any(|option| option.trim().is_empty()) {
                return Err(QuizError::BlankOption {
                    id: question.id.clone(),
                });
            }
            if let Some(answer) = &question.correct_answer
                && !question.has_option(answer)
            {
                return Err(QuizError::CorrectAnswerNotAnOption {
                    id: question.id.clone(),
                    answer: answer.clone(),
                });
            }
        }

        let scored = questions
            .iter()
            .filter(|question| question.correct_answer.is_some())
            .count();
        let kind = if scored == questions.len() {
            QuizKind::Scored
        } else if scored == 0 {
            QuizKind::Categorized
        } else {
            return Err(QuizError::MixedKinds);
        };

        Ok(Self { questions, kind })
    }

    pub fn kind(&self) -> QuizKind {
        self.kind
    }

    /// Number of questions; always at least one.
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Question at a 1-based step.
    pub fn at_step(&self, step: usize) -> Option<&Question> {
        step.checked_sub(1).and_then(|index| self.questions.get(index))
    }

    pub fn find(&self, question_id: &str) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.id == question_id)
    }
}
