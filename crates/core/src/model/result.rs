use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::question::{Category, Question};

/// Per-category totals of a fully answered survey.
///
/// Serializes as a flat JSON object, e.g. `{"mercy": 12, "teaching": 7}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftResult {
    totals: BTreeMap<Category, u32>,
}

impl GiftResult {
    /// Sum answers per category.
    ///
    /// Returns `None` if any question is unanswered.
    #[must_use]
    pub fn from_questions(questions: &[Question]) -> Option<Self> {
        let mut totals: BTreeMap<Category, u32> = BTreeMap::new();
        for question in questions {
            let answer = question.answer()?;
            let total = totals.entry(question.category().clone()).or_default();
            *total = total.saturating_add(u32::from(answer));
        }
        Some(Self { totals })
    }

    #[must_use]
    pub fn get(&self, category: &Category) -> Option<u32> {
        self.totals.get(category).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Categories in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Category, u32)> {
        self.totals.iter().map(|(category, total)| (category, *total))
    }

    /// Categories ordered by descending total; ties keep name order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&Category, u32)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, Rating};

    fn answered(id: u64, category: &str, answer: Option<i64>) -> Question {
        let mut q = Question::new(QuestionId::new(id), Category::new(category).unwrap(), "Q")
            .unwrap();
        q.set_answer(answer.map(|a| Rating::new(a).unwrap()));
        q
    }

    #[test]
    fn sums_per_category() {
        let questions = vec![
            answered(1, "A", Some(3)),
            answered(2, "B", Some(5)),
            answered(3, "A", Some(0)),
            answered(4, "A", Some(4)),
        ];

        let result = GiftResult::from_questions(&questions).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.get(&Category::new("A").unwrap()), Some(7));
        assert_eq!(result.get(&Category::new("B").unwrap()), Some(5));
    }

    #[test]
    fn incomplete_set_has_no_result() {
        let questions = vec![answered(1, "A", Some(3)), answered(2, "B", None)];
        assert!(GiftResult::from_questions(&questions).is_none());
    }

    #[test]
    fn serializes_as_flat_object() {
        let questions = vec![answered(1, "mercy", Some(2)), answered(2, "giving", Some(1))];
        let result = GiftResult::from_questions(&questions).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"giving":1,"mercy":2}"#);
    }

    #[test]
    fn ranked_orders_by_total() {
        let questions = vec![
            answered(1, "a", Some(1)),
            answered(2, "b", Some(4)),
            answered(3, "c", Some(1)),
        ];
        let result = GiftResult::from_questions(&questions).unwrap();
        let names: Vec<&str> = result.ranked().iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
