#![forbid(unsafe_code)]

pub mod error;
pub mod navigation;
pub mod survey;

pub use gifts_core::Clock;

pub use error::{NavigationError, SessionError, SurveyServiceError};
pub use navigation::Navigator;

pub use survey::{
    Advance, PageView, QuestionView, Retreat, Submission, SubmissionCommit, Submit,
    SurveyEvent, SurveyLoopService, SurveyProgress, SurveySession, SurveyState,
};
