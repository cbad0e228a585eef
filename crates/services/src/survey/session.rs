use std::collections::HashSet;

use gifts_core::model::{GiftResult, Pagination, Question, QuestionId, Rating};
use tokio::sync::broadcast;
use tracing::debug;

use super::events::SurveyEvent;
use super::progress::SurveyProgress;
use super::view::{PageView, QuestionView};
use crate::error::SessionError;

const EVENT_CAPACITY: usize = 64;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyState {
    Paging { page: usize },
    Submitting,
    Done,
}

/// Outcome of `SurveySession::advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { page: usize },
    /// The current page has unanswered questions; they are now flagged.
    Incomplete { missing: Vec<QuestionId> },
    AtLastPage,
    /// Submitting or done; nothing changed.
    Busy,
}

/// Outcome of `SurveySession::retreat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retreat {
    Moved { page: usize },
    AtFirstPage,
    /// Submitting or done; nothing changed.
    Busy,
}

/// Everything that has to be persisted when a submission commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionCommit {
    pub questions: Vec<Question>,
    pub result: GiftResult,
}

/// Outcome of `SurveySession::begin_submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submit {
    /// Validation passed; the session is now `Submitting`.
    Ready(SubmissionCommit),
    /// Some questions are unanswered; they are now flagged.
    Incomplete { missing: Vec<QuestionId> },
    NotOnLastPage,
    /// A submission is already running.
    InFlight,
    AlreadyDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Paging,
    Submitting,
    Done,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory survey session: questions with answers, the current page and
/// the submission phase.
///
/// All mutation goes through `set_answer`, `advance`, `retreat` and the
/// submission methods. Changes are broadcast as `SurveyEvent`s.
pub struct SurveySession {
    questions: Vec<Question>,
    pages: Pagination,
    current_page: usize,
    phase: Phase,
    events: broadcast::Sender<SurveyEvent>,
}

impl SurveySession {
    /// Create a session on page 1.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DuplicateQuestion` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, SessionError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(SessionError::DuplicateQuestion(question.id()));
            }
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            pages: Pagination::new(questions.len()),
            questions,
            current_page: 1,
            phase: Phase::Paging,
            events,
        })
    }

    /// Receive change notifications from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SurveyEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.pages.is_last(self.current_page)
    }

    #[must_use]
    pub fn state(&self) -> SurveyState {
        match self.phase {
            Phase::Paging => SurveyState::Paging {
                page: self.current_page,
            },
            Phase::Submitting => SurveyState::Submitting,
            Phase::Done => SurveyState::Done,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Questions of the current page, with their error flags.
    #[must_use]
    pub fn page(&self) -> PageView {
        let range = self.pages.range(self.current_page);
        let start = range.start;
        let questions = self.questions[range]
            .iter()
            .enumerate()
            .map(|(offset, question)| QuestionView::from_question(start + offset + 1, question))
            .collect();

        PageView {
            page: self.current_page,
            page_count: self.page_count(),
            questions,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SurveyProgress {
        SurveyProgress {
            total: self.questions.len(),
            answered: self.questions.iter().filter(|q| q.is_answered()).count(),
            current_page: self.current_page,
            page_count: self.page_count(),
        }
    }

    /// Per-category totals, if every question is answered.
    #[must_use]
    pub fn aggregate(&self) -> Option<GiftResult> {
        GiftResult::from_questions(&self.questions)
    }

    /// Set or clear the answer of one question.
    ///
    /// A new answer clears the question's error flag. Nothing else changes.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` for an id not in this survey,
    /// `SessionError::Busy` while submitting and `SessionError::Completed` once done.
    pub fn set_answer(
        &mut self,
        id: QuestionId,
        answer: Option<Rating>,
    ) -> Result<(), SessionError> {
        match self.phase {
            Phase::Paging => {}
            Phase::Submitting => return Err(SessionError::Busy),
            Phase::Done => return Err(SessionError::Completed),
        }

        let question = self
            .questions
            .iter_mut()
            .find(|q| q.id() == id)
            .ok_or(SessionError::UnknownQuestion(id))?;
        question.set_answer(answer);

        self.emit(SurveyEvent::AnswerChanged { id });
        Ok(())
    }

    /// Go back one page. No validation.
    pub fn retreat(&mut self) -> Retreat {
        if self.phase != Phase::Paging {
            return Retreat::Busy;
        }
        if self.current_page <= 1 {
            return Retreat::AtFirstPage;
        }

        self.current_page -= 1;
        debug!(page = self.current_page, "survey page retreated");
        self.emit(SurveyEvent::PageChanged {
            page: self.current_page,
        });
        Retreat::Moved {
            page: self.current_page,
        }
    }

    /// Validate the current page and move to the next one.
    ///
    /// Unanswered questions on this page are flagged and the page stays put.
    pub fn advance(&mut self) -> Advance {
        if self.phase != Phase::Paging {
            return Advance::Busy;
        }
        if self.is_last_page() {
            return Advance::AtLastPage;
        }

        let range = self.pages.range(self.current_page);
        let missing = flag_unanswered(&mut self.questions[range]);
        if !missing.is_empty() {
            debug!(
                page = self.current_page,
                missing = missing.len(),
                "survey page incomplete"
            );
            self.emit(SurveyEvent::MustAnswerAll {
                missing: missing.clone(),
            });
            return Advance::Incomplete { missing };
        }

        self.current_page += 1;
        debug!(page = self.current_page, "survey page advanced");
        self.emit(SurveyEvent::PageChanged {
            page: self.current_page,
        });
        Advance::Moved {
            page: self.current_page,
        }
    }

    /// Validate every question and, if all are answered, enter `Submitting`.
    ///
    /// The returned commit must be followed by `finish_submit` once it has been
    /// persisted, or `abort_submit` if persisting failed.
    pub fn begin_submit(&mut self) -> Submit {
        match self.phase {
            Phase::Paging => {}
            Phase::Submitting => return Submit::InFlight,
            Phase::Done => return Submit::AlreadyDone,
        }
        if !self.is_last_page() {
            return Submit::NotOnLastPage;
        }

        let missing = flag_unanswered(&mut self.questions);
        if !missing.is_empty() {
            debug!(missing = missing.len(), "survey submission incomplete");
            self.emit(SurveyEvent::MustAnswerAll {
                missing: missing.clone(),
            });
            return Submit::Incomplete { missing };
        }

        let Some(result) = self.aggregate() else {
            // Every question is answered at this point.
            return Submit::Incomplete {
                missing: Vec::new(),
            };
        };

        self.phase = Phase::Submitting;
        self.emit(SurveyEvent::SubmitStarted);
        Submit::Ready(SubmissionCommit {
            questions: self.questions.clone(),
            result,
        })
    }

    /// Mark the running submission as committed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitting` if no submission is running.
    pub fn finish_submit(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Submitting {
            return Err(SessionError::NotSubmitting);
        }
        self.phase = Phase::Done;
        self.emit(SurveyEvent::Submitted);
        Ok(())
    }

    /// Return to paging after a failed commit, keeping all answers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitting` if no submission is running.
    pub fn abort_submit(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Submitting {
            return Err(SessionError::NotSubmitting);
        }
        self.phase = Phase::Paging;
        self.emit(SurveyEvent::SubmitFailed);
        Ok(())
    }

    fn emit(&self, event: SurveyEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn flag_unanswered(questions: &mut [Question]) -> Vec<QuestionId> {
    questions
        .iter_mut()
        .filter_map(|q| q.flag_if_unanswered().then(|| q.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gifts_core::model::Category;

    fn questions(n: u64) -> Vec<Question> {
        (1..=n)
            .map(|id| {
                let category = if id % 2 == 0 { "even" } else { "odd" };
                Question::new(
                    QuestionId::new(id),
                    Category::new(category).unwrap(),
                    format!("Question {id}"),
                )
                .unwrap()
            })
            .collect()
    }

    fn rating(value: i64) -> Option<Rating> {
        Some(Rating::new(value).unwrap())
    }

    fn answer_range(session: &mut SurveySession, ids: std::ops::RangeInclusive<u64>, value: i64) {
        for id in ids {
            session.set_answer(QuestionId::new(id), rating(value)).unwrap();
        }
    }

    fn flags(session: &SurveySession) -> Vec<bool> {
        session.questions().iter().map(Question::has_error).collect()
    }

    #[test]
    fn starts_on_first_page() {
        let session = SurveySession::new(questions(12)).unwrap();
        assert_eq!(session.state(), SurveyState::Paging { page: 1 });
        assert_eq!(session.page_count(), 2);

        let page = session.page();
        assert_eq!(page.questions.len(), 10);
        assert_eq!(page.questions[0].number, 1);
        assert!(page.is_first());
        assert!(!page.is_last());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut qs = questions(2);
        qs.push(qs[0].clone());
        assert_eq!(
            SurveySession::new(qs).err(),
            Some(SessionError::DuplicateQuestion(QuestionId::new(1)))
        );
    }

    #[test]
    fn retreat_on_first_page_is_noop() {
        let mut session = SurveySession::new(questions(12)).unwrap();
        assert_eq!(session.retreat(), Retreat::AtFirstPage);
        assert_eq!(session.current_page(), 1);
    }

    #[test]
    fn advance_flags_exactly_unanswered_on_current_page() {
        let mut session = SurveySession::new(questions(12)).unwrap();
        answer_range(&mut session, 1..=8, 3);

        let outcome = session.advance();

        assert_eq!(
            outcome,
            Advance::Incomplete {
                missing: vec![QuestionId::new(9), QuestionId::new(10)]
            }
        );
        assert_eq!(session.current_page(), 1);
        let mut expected = vec![false; 12];
        expected[8] = true;
        expected[9] = true;
        assert_eq!(flags(&session), expected);
    }

    #[test]
    fn failed_advance_is_idempotent() {
        let mut session = SurveySession::new(questions(12)).unwrap();
        answer_range(&mut session, 1..=5, 1);

        let first = session.advance();
        let after_first = session.questions().to_vec();
        let second = session.advance();

        assert_eq!(first, second);
        assert_eq!(session.questions(), after_first.as_slice());
        assert_eq!(session.current_page(), 1);
    }

    #[test]
    fn advance_on_complete_page_moves_without_touching_flags() {
        let mut session = SurveySession::new(questions(12)).unwrap();
        answer_range(&mut session, 1..=10, 2);
        let before = flags(&session);

        assert_eq!(session.advance(), Advance::Moved { page: 2 });
        assert_eq!(session.current_page(), 2);
        assert_eq!(flags(&session), before);

        let page = session.page();
        assert_eq!(page.questions.len(), 2);
        assert_eq!(page.questions[0].number, 11);
        assert!(page.is_last());
        assert_eq!(session.advance(), Advance::AtLastPage);

        assert_eq!(session.retreat(), Retreat::Moved { page: 1 });
    }

    #[test]
    fn set_answer_clears_flag_and_rejects_unknown_ids() {
        let mut session = SurveySession::new(questions(3)).unwrap();
        let _ = session.begin_submit();
        assert!(session.questions()[0].has_error());

        session.set_answer(QuestionId::new(1), rating(0)).unwrap();
        let first = session.question(QuestionId::new(1)).unwrap();
        assert!(!first.has_error());
        assert_eq!(first.answer(), rating(0));
        assert!(session.questions()[1].has_error());

        assert_eq!(
            session.set_answer(QuestionId::new(99), rating(1)),
            Err(SessionError::UnknownQuestion(QuestionId::new(99)))
        );
    }

    #[test]
    fn submit_requires_every_question() {
        let mut session = SurveySession::new(questions(12)).unwrap();
        answer_range(&mut session, 1..=10, 4);
        session.advance();

        let outcome = session.begin_submit();

        assert_eq!(
            outcome,
            Submit::Incomplete {
                missing: vec![QuestionId::new(11), QuestionId::new(12)]
            }
        );
        assert_eq!(session.state(), SurveyState::Paging { page: 2 });
    }

    #[test]
    fn submit_only_from_last_page() {
        let mut session = SurveySession::new(questions(12)).unwrap();
        answer_range(&mut session, 1..=12, 4);
        assert_eq!(session.begin_submit(), Submit::NotOnLastPage);
        assert!(flags(&session).iter().all(|f| !f));
    }

    #[test]
    fn submit_aggregates_and_locks_session() {
        let mut session = SurveySession::new(questions(12)).unwrap();
        answer_range(&mut session, 1..=12, 5);
        session.set_answer(QuestionId::new(2), rating(1)).unwrap();
        session.advance();

        let Submit::Ready(commit) = session.begin_submit() else {
            panic!("expected ready submission");
        };
        assert_eq!(commit.questions.len(), 12);
        assert_eq!(commit.result.get(&Category::new("odd").unwrap()), Some(30));
        assert_eq!(commit.result.get(&Category::new("even").unwrap()), Some(26));

        assert_eq!(session.state(), SurveyState::Submitting);
        assert_eq!(session.begin_submit(), Submit::InFlight);
        assert_eq!(session.advance(), Advance::Busy);
        assert_eq!(session.retreat(), Retreat::Busy);
        assert_eq!(
            session.set_answer(QuestionId::new(1), rating(0)),
            Err(SessionError::Busy)
        );

        session.finish_submit().unwrap();
        assert!(session.is_done());
        assert_eq!(session.begin_submit(), Submit::AlreadyDone);
        assert_eq!(session.finish_submit(), Err(SessionError::NotSubmitting));
    }

    #[test]
    fn abort_returns_to_paging() {
        let mut session = SurveySession::new(questions(3)).unwrap();
        answer_range(&mut session, 1..=3, 2);
        assert!(matches!(session.begin_submit(), Submit::Ready(_)));

        session.abort_submit().unwrap();

        assert_eq!(session.state(), SurveyState::Paging { page: 1 });
        assert_eq!(session.progress().answered, 3);
    }

    #[test]
    fn emits_events() {
        let mut session = SurveySession::new(questions(11)).unwrap();
        let mut rx = session.subscribe();

        session.advance();
        answer_range(&mut session, 1..=10, 1);
        session.advance();

        assert!(matches!(
            rx.try_recv().unwrap(),
            SurveyEvent::MustAnswerAll { missing } if missing.len() == 10
        ));
        for id in 1..=10 {
            assert_eq!(
                rx.try_recv().unwrap(),
                SurveyEvent::AnswerChanged {
                    id: QuestionId::new(id)
                }
            );
        }
        assert_eq!(rx.try_recv().unwrap(), SurveyEvent::PageChanged { page: 2 });
    }

    #[test]
    fn empty_survey_has_one_page() {
        let mut session = SurveySession::new(Vec::new()).unwrap();
        assert_eq!(session.current_page(), 1);
        assert!(session.page().questions.is_empty());
        assert_eq!(session.advance(), Advance::AtLastPage);
        assert!(matches!(session.begin_submit(), Submit::Ready(c) if c.result.is_empty()));
    }
}
