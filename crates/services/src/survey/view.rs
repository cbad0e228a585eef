use gifts_core::model::{Category, Question, QuestionId, Rating};

/// Presentation-agnostic row for one question on the current page.
///
/// `number` is the 1-based position in the whole survey, which is what
/// respondents see and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub number: usize,
    pub id: QuestionId,
    pub category: Category,
    pub text: String,
    pub answer: Option<Rating>,
    pub has_error: bool,
}

impl QuestionView {
    #[must_use]
    pub fn from_question(number: usize, question: &Question) -> Self {
        Self {
            number,
            id: question.id(),
            category: question.category().clone(),
            text: question.text().to_owned(),
            answer: question.answer(),
            has_error: question.has_error(),
        }
    }
}

/// Snapshot of the page currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub page: usize,
    pub page_count: usize,
    pub questions: Vec<QuestionView>,
}

impl PageView {
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.page <= 1
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.page >= self.page_count
    }
}
