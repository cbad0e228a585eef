use std::sync::Arc;

use gifts_core::Catalog;
use gifts_core::model::{GiftResult, QuestionId};
use storage::repository::{QuestionRecord, SurveyRepository};
use tracing::{info, warn};

use super::restore::merge_restored;
use super::session::{Submit, SurveySession};
use crate::Clock;
use crate::error::SurveyServiceError;
use crate::navigation::Navigator;

/// Result of asking the service to submit a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Both results were persisted and the navigator was called.
    Submitted(GiftResult),
    /// Unanswered questions were flagged; nothing was persisted.
    Incomplete { missing: Vec<QuestionId> },
    NotOnLastPage,
    InFlight,
    AlreadyDone,
}

/// Orchestrates session restore and the persisted submission commit.
#[derive(Clone)]
pub struct SurveyLoopService {
    clock: Clock,
    survey: Arc<dyn SurveyRepository>,
    navigator: Arc<dyn Navigator>,
}

impl SurveyLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        survey: Arc<dyn SurveyRepository>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            clock,
            survey,
            navigator,
        }
    }

    /// Start a session from the catalog, merged with the last saved session if any.
    ///
    /// Missing, unreadable or malformed saved data falls back to the catalog as is.
    ///
    /// # Errors
    ///
    /// Returns `SurveyServiceError::Session` if the resulting question list is invalid.
    pub async fn start(&self, catalog: Catalog) -> Result<SurveySession, SurveyServiceError> {
        let seed = catalog.into_questions();

        let questions = match self.survey.load_questions().await {
            Ok(Some(records)) => match merge_restored(seed.clone(), records) {
                Ok(merged) => {
                    info!(questions = merged.len(), "restored previous survey answers");
                    merged
                }
                Err(err) => {
                    warn!(error = %err, "ignoring saved survey");
                    seed
                }
            },
            Ok(None) => seed,
            Err(err) => {
                warn!(error = %err, "could not read saved survey, starting fresh");
                seed
            }
        };

        Ok(SurveySession::new(questions)?)
    }

    /// Validate and, on success, persist the session and its result, then navigate.
    ///
    /// Writes happen in order: questions, result, then the navigator is called once.
    /// If any step fails the session returns to paging with its answers intact.
    ///
    /// # Errors
    ///
    /// Returns `SurveyServiceError::Storage` or `SurveyServiceError::Navigation`
    /// when the commit fails.
    pub async fn submit(
        &self,
        session: &mut SurveySession,
    ) -> Result<Submission, SurveyServiceError> {
        let commit = match session.begin_submit() {
            Submit::Ready(commit) => commit,
            Submit::Incomplete { missing } => return Ok(Submission::Incomplete { missing }),
            Submit::NotOnLastPage => return Ok(Submission::NotOnLastPage),
            Submit::InFlight => return Ok(Submission::InFlight),
            Submit::AlreadyDone => return Ok(Submission::AlreadyDone),
        };

        let records: Vec<QuestionRecord> = commit
            .questions
            .iter()
            .map(QuestionRecord::from_question)
            .collect();
        let saved_at = self.clock.now();

        let committed = async {
            self.survey.save_questions(&records, saved_at).await?;
            self.survey.save_result(&commit.result, saved_at).await?;
            self.navigator.navigate_to_results().await?;
            Ok::<(), SurveyServiceError>(())
        }
        .await;

        if let Err(err) = committed {
            warn!(error = %err, "survey submission failed");
            session.abort_submit()?;
            return Err(err);
        }

        session.finish_submit()?;
        info!(
            questions = records.len(),
            categories = commit.result.len(),
            "survey submitted"
        );
        Ok(Submission::Submitted(commit.result))
    }

    /// Load the result saved by the last successful submission.
    ///
    /// # Errors
    ///
    /// Returns `SurveyServiceError::Storage` on repository failures.
    pub async fn load_result(&self) -> Result<Option<GiftResult>, SurveyServiceError> {
        Ok(self.survey.load_result().await?)
    }
}
