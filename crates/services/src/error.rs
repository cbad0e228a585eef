//! Shared error types for the services crate.

use thiserror::Error;

use gifts_core::model::QuestionId;
use storage::repository::StorageError;

/// Errors emitted by `SurveySession`.
///
/// Unanswered questions are not errors: they come back as outcome values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("unknown question {0}")]
    UnknownQuestion(QuestionId),
    #[error("duplicate question {0}")]
    DuplicateQuestion(QuestionId),
    #[error("survey is being submitted")]
    Busy,
    #[error("survey already submitted")]
    Completed,
    #[error("survey is not being submitted")]
    NotSubmitting,
}

/// Errors emitted by a `Navigator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("navigation failed: {0}")]
    Failed(String),
}

/// Errors emitted by `SurveyLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SurveyServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}
