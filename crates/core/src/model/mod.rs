mod ids;
mod page;
mod question;
mod rating;
mod result;

pub use ids::QuestionId;
pub use page::{PAGE_SIZE, Pagination};
pub use question::{Category, Question, QuestionError};
pub use rating::{Rating, RatingError};
pub use result::GiftResult;
