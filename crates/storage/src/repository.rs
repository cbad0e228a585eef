use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gifts_core::model::{Category, GiftResult, Question, QuestionId, Rating};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key holding the full question list of the last submitted survey.
pub const QUESTIONS_KEY: &str = "giftQuestions";

/// Key holding the per-category totals of the last submitted survey.
pub const RESULT_KEY: &str = "giftResult";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Persisted shape for a question.
///
/// Field names follow the stored JSON (`type`, `hasError`). `text` is written
/// on submit but ignored on restore, where the seed text wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<i64>,
    #[serde(default)]
    pub has_error: bool,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id(),
            category: question.category().clone(),
            text: Some(question.text().to_owned()),
            answer: question.answer().map(|rating| i64::from(rating.value())),
            has_error: question.has_error(),
        }
    }

    /// The stored answer, if it is a valid rating.
    ///
    /// Out-of-range values are treated as unanswered.
    #[must_use]
    pub fn rating(&self) -> Option<Rating> {
        self.answer.and_then(|value| Rating::new(value).ok())
    }

    /// Convert the record into a domain `Question` using the given display text.
    #[must_use]
    pub fn into_question(self, text: String) -> Question {
        let answer = self.rating();
        Question::from_persisted(self.id, self.category, text, answer, self.has_error)
    }
}

/// Raw key-value contract: string keys, string values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn put(&self, key: &str, value: &str, written_at: DateTime<Utc>)
    -> Result<(), StorageError>;
}

/// Typed survey persistence on top of a key-value store.
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// Load the question list saved by the last successful submission.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is malformed.
    async fn load_questions(&self) -> Result<Option<Vec<QuestionRecord>>, StorageError>;

    /// Persist the full question list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be stored.
    async fn save_questions(
        &self,
        records: &[QuestionRecord],
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Load the per-category totals saved by the last successful submission.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is malformed.
    async fn load_result(&self) -> Result<Option<GiftResult>, StorageError>;

    /// Persist the per-category totals.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn save_result(
        &self,
        result: &GiftResult,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

#[async_trait]
impl<T> SurveyRepository for T
where
    T: KeyValueStore + ?Sized,
{
    async fn load_questions(&self) -> Result<Option<Vec<QuestionRecord>>, StorageError> {
        let Some(raw) = self.get(QUESTIONS_KEY).await? else {
            return Ok(None);
        };
        // A stored JSON `null` is the same as nothing stored.
        let records: Option<Vec<QuestionRecord>> = serde_json::from_str(&raw)?;
        Ok(records)
    }

    async fn save_questions(
        &self,
        records: &[QuestionRecord],
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records)?;
        self.put(QUESTIONS_KEY, &raw, saved_at).await
    }

    async fn load_result(&self) -> Result<Option<GiftResult>, StorageError> {
        let Some(raw) = self.get(RESULT_KEY).await? else {
            return Ok(None);
        };
        let result: Option<GiftResult> = serde_json::from_str(&raw)?;
        Ok(result)
    }

    async fn save_result(
        &self,
        result: &GiftResult,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(result)?;
        self.put(RESULT_KEY, &raw, saved_at).await
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(
        &self,
        key: &str,
        value: &str,
        _written_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Survey persistence behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub survey: Arc<dyn SurveyRepository>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gifts_core::time::fixed_now;

    fn question(id: u64, category: &str, answer: Option<i64>) -> Question {
        let mut q = Question::new(
            QuestionId::new(id),
            Category::new(category).unwrap(),
            format!("Question {id}"),
        )
        .unwrap();
        q.set_answer(answer.map(|a| Rating::new(a).unwrap()));
        q
    }

    #[tokio::test]
    async fn missing_keys_load_as_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_questions().await.unwrap().is_none());
        assert!(repo.load_result().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stored_null_loads_as_none() {
        let repo = InMemoryRepository::new();
        repo.put(QUESTIONS_KEY, "null", fixed_now()).await.unwrap();
        assert!(repo.load_questions().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_questions_are_a_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.put(QUESTIONS_KEY, "{not json", fixed_now())
            .await
            .unwrap();
        let err = repo.load_questions().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn saves_questions_with_stored_field_names() {
        let repo = InMemoryRepository::new();
        let records = vec![QuestionRecord::from_question(&question(1, "A", Some(3)))];
        repo.save_questions(&records, fixed_now()).await.unwrap();

        let raw = repo.get(QUESTIONS_KEY).await.unwrap().unwrap();
        assert_eq!(
            raw,
            r#"[{"id":1,"type":"A","text":"Question 1","answer":3,"hasError":false}]"#
        );
        assert_eq!(repo.load_questions().await.unwrap(), Some(records));
    }

    #[tokio::test]
    async fn saves_result_as_flat_object() {
        let repo = InMemoryRepository::new();
        let questions = vec![question(1, "A", Some(3)), question(2, "A", Some(2))];
        let result = GiftResult::from_questions(&questions).unwrap();
        repo.save_result(&result, fixed_now()).await.unwrap();

        assert_eq!(
            repo.get(RESULT_KEY).await.unwrap().as_deref(),
            Some(r#"{"A":5}"#)
        );
        assert_eq!(repo.load_result().await.unwrap(), Some(result));
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn record_without_text_or_flags_parses() {
        let record: QuestionRecord =
            serde_json::from_str(r#"{"id": 4, "type": "mercy", "answer": 9}"#).unwrap();
        assert_eq!(record.text, None);
        assert!(!record.has_error);
        assert_eq!(record.rating(), None);

        let q = record.into_question("Seed text".into());
        assert_eq!(q.text(), "Seed text");
        assert!(!q.is_answered());
    }
}
