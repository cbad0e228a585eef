//! Seed question sets.
//!
//! A catalog is the fixed, ordered question list a survey starts from. Its
//! text is authoritative: restored sessions only contribute answers.

use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{Category, Question, QuestionError, QuestionId};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog has no questions")]
    Empty,

    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),

    #[error("invalid question {id}: {source}")]
    InvalidQuestion {
        id: QuestionId,
        #[source]
        source: QuestionError,
    },

    #[error("malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: QuestionId,
    #[serde(rename = "type")]
    category: String,
    text: String,
}

/// Validated, ordered seed questions with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    /// Build a catalog from already constructed questions.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::DuplicateId` if two questions share an id.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(CatalogError::DuplicateId(question.id()));
            }
        }

        Ok(Self { questions })
    }

    /// Parse a catalog from JSON: `[{"id": 1, "type": "teaching", "text": "..."}]`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed or any entry is invalid.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(raw)?;
        let questions = entries
            .into_iter()
            .map(|entry| {
                Category::new(entry.category)
                    .and_then(|category| Question::new(entry.id, category, entry.text))
                    .map_err(|source| CatalogError::InvalidQuestion {
                        id: entry.id,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_questions(questions)
    }

    /// The questions shipped with the application.
    #[must_use]
    pub fn builtin() -> Self {
        let questions = BUILTIN
            .iter()
            .zip(1_u64..)
            .filter_map(|((category, text), id)| {
                let category = Category::new(*category).ok()?;
                Question::new(QuestionId::new(id), category, *text).ok()
            })
            .collect();
        Self { questions }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

const BUILTIN: &[(&str, &str)] = &[
    ("teaching", "Likes to explain to friends what a Bible story means."),
    ("serving", "Notices jobs that need doing and does them without being asked."),
    ("mercy", "Feels sad with people who are hurting and wants to comfort them."),
    ("leadership", "Other children follow when they suggest a game or a plan."),
    ("giving", "Happily shares toys, snacks or pocket money with others."),
    ("encouragement", "Cheers others up with kind words when they are discouraged."),
    ("teaching", "Enjoys looking up answers and learning new things about God."),
    ("serving", "Likes helping set up or tidy up at church and at home."),
    ("mercy", "Is patient and gentle with younger or weaker children."),
    ("leadership", "Organizes friends to get a task done together."),
    ("giving", "Asks to give to people in need when hearing about them."),
    ("encouragement", "Tells others they can do it when something is hard."),
    ("teaching", "Remembers details of lessons and can repeat them correctly."),
    ("serving", "Prefers working behind the scenes to being in front."),
    ("mercy", "Visits or prays for people who are sick or lonely."),
    ("leadership", "Is not afraid to make decisions for a group."),
    ("giving", "Gives without expecting anything back."),
    ("encouragement", "Notices when someone is left out and invites them in."),
    ("teaching", "Likes to help classmates understand their homework."),
    ("serving", "Feels happy when they can be useful to someone."),
    ("mercy", "Forgives quickly when others hurt them."),
    ("leadership", "Can explain a goal so others want to reach it too."),
    ("giving", "Saves up in order to buy presents for others."),
    ("encouragement", "Writes notes or draws pictures to cheer people up."),
];
