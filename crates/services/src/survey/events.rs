use gifts_core::model::QuestionId;

/// Change notifications emitted by `SurveySession`.
///
/// Display surfaces subscribe and re-read `SurveySession::page()` as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyEvent {
    AnswerChanged { id: QuestionId },
    PageChanged { page: usize },
    /// Some questions still need an answer; surface a "please answer all questions" notice.
    MustAnswerAll { missing: Vec<QuestionId> },
    SubmitStarted,
    SubmitFailed,
    Submitted,
}
