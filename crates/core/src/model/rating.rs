use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building a rating from raw input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating must be between {min} and {max}, got {value}", min = Rating::MIN, max = Rating::MAX)]
    OutOfRange { value: i64 },

    #[error("rating is not a number: {raw:?}")]
    NotANumber { raw: String },
}

//
// ─── RATING ───────────────────────────────────────────────────────────────────
//

/// Six-level answer to a rating question.
///
/// `0` means "not at all like my child", `5` means "very much like my child".
/// A `Rating` can only hold values in the closed range `[0, 5]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 5;

    /// Label shown next to the lowest rating.
    pub const LOW_LABEL: &'static str = "not at all like my child";
    /// Label shown next to the highest rating.
    pub const HIGH_LABEL: &'static str = "very much like my child";

    /// Converts a raw integer into a `Rating`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::OutOfRange` if the value is not in `[0, 5]`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange { value })
    }

    /// Parses user input such as `"4"`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::NotANumber` for non-integer input and
    /// `RatingError::OutOfRange` for integers outside `[0, 5]`.
    pub fn parse(raw: &str) -> Result<Self, RatingError> {
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| RatingError::NotANumber {
                raw: raw.to_string(),
            })?;
        Self::new(value)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// All ratings in ascending order.
    pub fn all() -> impl Iterator<Item = Rating> {
        (Self::MIN..=Self::MAX).map(Rating)
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl From<Rating> for u32 {
    fn from(rating: Rating) -> Self {
        u32::from(rating.0)
    }
}

impl fmt::Debug for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rating({})", self.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_through_five() {
        let values: Vec<u8> = Rating::all().map(Rating::value).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(Rating::new(0).unwrap().value(), 0);
        assert_eq!(Rating::new(5).unwrap().value(), 5);
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(Rating::new(6), Err(RatingError::OutOfRange { value: 6 }));
        assert_eq!(Rating::new(-1), Err(RatingError::OutOfRange { value: -1 }));
        assert_eq!(
            Rating::new(i64::MAX),
            Err(RatingError::OutOfRange { value: i64::MAX })
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Rating::parse(" 3 ").unwrap().value(), 3);
        assert!(matches!(
            Rating::parse("three"),
            Err(RatingError::NotANumber { .. })
        ));
        assert!(matches!(
            Rating::parse("2.5"),
            Err(RatingError::NotANumber { .. })
        ));
    }

    #[test]
    fn deserialize_validates_range() {
        let ok: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "4");
    }
}
