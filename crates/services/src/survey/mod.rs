mod events;
mod progress;
mod restore;
mod session;
mod view;
mod workflow;

// Public API of the survey subsystem.
pub use crate::error::SessionError;
pub use events::SurveyEvent;
pub use progress::SurveyProgress;
pub use restore::{RestoreError, merge_restored};
pub use session::{Advance, Retreat, SubmissionCommit, Submit, SurveySession, SurveyState};
pub use view::{PageView, QuestionView};
pub use workflow::{Submission, SurveyLoopService};
