use std::collections::HashSet;

use gifts_core::model::{Question, QuestionId};
use storage::repository::QuestionRecord;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RestoreError {
    #[error("restored session repeats question {0}")]
    DuplicateId(QuestionId),
}

/// Merge a previously saved question list into the seed questions, by position.
///
/// Position `i` takes id, category, answer and error flag from `restored[i]`
/// and text from `seed[i]`. Extra restored entries have no seed text and are
/// dropped; seed entries past the end of `restored` are kept as they are.
///
/// # Errors
///
/// Returns `RestoreError::DuplicateId` if the merged list would repeat an id.
/// Callers fall back to the seed questions in that case.
pub fn merge_restored(
    seed: Vec<Question>,
    restored: Vec<QuestionRecord>,
) -> Result<Vec<Question>, RestoreError> {
    let mut restored = restored.into_iter();
    let merged: Vec<Question> = seed
        .into_iter()
        .map(|seed_question| match restored.next() {
            Some(record) => record.into_question(seed_question.text().to_owned()),
            None => seed_question,
        })
        .collect();

    let mut seen = HashSet::with_capacity(merged.len());
    for question in &merged {
        if !seen.insert(question.id()) {
            return Err(RestoreError::DuplicateId(question.id()));
        }
    }

    Ok(merged)
}
