use gifts_core::model::{Rating, RatingError};
use thiserror::Error;

/// One line typed by the respondent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// `<number> <rating>`: answer the question shown with that number.
    Answer { number: usize, rating: Rating },
    /// `clear <number>`
    Clear { number: usize },
    Next,
    Back,
    Submit,
    Help,
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("type a command, or `help`")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("invalid question number: {0}")]
    InvalidNumber(String),
    #[error("missing rating after question {0}")]
    MissingRating(usize),
    #[error(transparent)]
    Rating(#[from] RatingError),
}

impl Input {
    /// Parse a line of user input.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for anything that is not a known command or a
    /// `<number> <rating>` pair with a rating in `[0, 5]`.
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Err(InputError::Empty);
        };

        match first.to_ascii_lowercase().as_str() {
            "n" | "next" => return Ok(Self::Next),
            "b" | "back" | "prev" => return Ok(Self::Back),
            "s" | "submit" => return Ok(Self::Submit),
            "h" | "help" | "?" => return Ok(Self::Help),
            "q" | "quit" | "exit" => return Ok(Self::Quit),
            "clear" => {
                let raw = words.next().unwrap_or_default();
                return Ok(Self::Clear {
                    number: parse_number(raw)?,
                });
            }
            _ => {}
        }

        if !first.chars().all(|c| c.is_ascii_digit()) {
            return Err(InputError::Unknown(first.to_string()));
        }
        let number = parse_number(first)?;
        let raw_rating = words.next().ok_or(InputError::MissingRating(number))?;
        let rating = Rating::parse(raw_rating)?;
        Ok(Self::Answer { number, rating })
    }
}

fn parse_number(raw: &str) -> Result<usize, InputError> {
    raw.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| InputError::InvalidNumber(raw.to_string()))
}

pub const HELP: &str = "\
Commands:
  <number> <0-5>   answer a question, e.g. `3 4`
  clear <number>   remove an answer
  next | n         go to the next page
  back | b         go to the previous page
  submit | s       send your answers (last page)
  help | h         show this help
  quit | q         leave without submitting";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answers() {
        assert_eq!(
            Input::parse(" 12 5 ").unwrap(),
            Input::Answer {
                number: 12,
                rating: Rating::new(5).unwrap()
            }
        );
        assert_eq!(
            Input::parse("3 0").unwrap(),
            Input::Answer {
                number: 3,
                rating: Rating::new(0).unwrap()
            }
        );
    }

    #[test]
    fn rejects_out_of_range_ratings() {
        assert_eq!(
            Input::parse("3 6"),
            Err(InputError::Rating(RatingError::OutOfRange { value: 6 }))
        );
        assert!(matches!(
            Input::parse("3 -1"),
            Err(InputError::Rating(RatingError::OutOfRange { value: -1 }))
        ));
        assert_eq!(Input::parse("3"), Err(InputError::MissingRating(3)));
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("next").unwrap(), Input::Next);
        assert_eq!(Input::parse("B").unwrap(), Input::Back);
        assert_eq!(Input::parse("s").unwrap(), Input::Submit);
        assert_eq!(Input::parse("clear 4").unwrap(), Input::Clear { number: 4 });
        assert_eq!(Input::parse("q").unwrap(), Input::Quit);
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert_eq!(Input::parse("   "), Err(InputError::Empty));
        assert_eq!(
            Input::parse("jump"),
            Err(InputError::Unknown("jump".into()))
        );
        assert_eq!(
            Input::parse("0 3"),
            Err(InputError::InvalidNumber("0".into()))
        );
        assert_eq!(
            Input::parse("clear"),
            Err(InputError::InvalidNumber(String::new()))
        );
    }
}
