use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::rating::Rating;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question category cannot be empty")]
    EmptyCategory,

    #[error("question text cannot be empty")]
    EmptyText,
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Category tag a question contributes to (e.g. `"teaching"`).
///
/// Answers are summed per category when the survey is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Build a category tag, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyCategory` if the tag is blank.
    pub fn new(tag: impl Into<String>) -> Result<Self, QuestionError> {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(QuestionError::EmptyCategory);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Category {
    type Error = QuestionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single rating question together with the respondent's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    category: Category,
    text: String,
    answer: Option<Rating>,
    has_error: bool,
}

impl Question {
    /// Create an unanswered question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` if `text` is blank.
    pub fn new(
        id: QuestionId,
        category: Category,
        text: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        Ok(Self {
            id,
            category,
            text,
            answer: None,
            has_error: false,
        })
    }

    /// Rehydrate a question from persisted state.
    ///
    /// Text is not validated here: it is always replaced by the seed text on restore.
    #[must_use]
    pub fn from_persisted(
        id: QuestionId,
        category: Category,
        text: String,
        answer: Option<Rating>,
        has_error: bool,
    ) -> Self {
        Self {
            id,
            category,
            text,
            answer,
            has_error,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn answer(&self) -> Option<Rating> {
        self.answer
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    /// Record (or clear) the answer.
    ///
    /// A valid answer clears the error flag; clearing the answer leaves the flag as is.
    pub fn set_answer(&mut self, answer: Option<Rating>) {
        self.answer = answer;
        if answer.is_some() {
            self.has_error = false;
        }
    }

    /// Flag the question if it has no answer.
    ///
    /// Returns `true` when the question was missing an answer.
    pub fn flag_if_unanswered(&mut self) -> bool {
        if self.answer.is_none() {
            self.has_error = true;
            return true;
        }
        false
    }
}
