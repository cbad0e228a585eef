//! Line-oriented display surface for running a survey in a terminal.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use gifts_core::model::{GiftResult, Rating};
use services::{
    Advance, NavigationError, Navigator, PageView, Retreat, SessionError, Submission,
    SurveyEvent, SurveyLoopService, SurveyProgress, SurveySession,
};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::input::{HELP, Input};

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// How the survey loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    Submitted(GiftResult),
    Quit,
}

/// Navigator that just records that the results view was requested.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    requested: AtomicBool,
}

impl TerminalNavigator {
    #[must_use]
    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Navigator for TerminalNavigator {
    async fn navigate_to_results(&self) -> Result<(), NavigationError> {
        self.requested.store(true, Ordering::Release);
        Ok(())
    }
}

/// Drive a session from input lines until it is submitted or the user quits.
///
/// # Errors
///
/// Returns `SurfaceError` if reading input or writing output fails.
pub async fn run_survey<R, W>(
    service: &SurveyLoopService,
    session: &mut SurveySession,
    input: R,
    out: &mut W,
) -> Result<Exit, SurfaceError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut events = session.subscribe();
    let mut lines = input.lines();

    writeln!(out, "Type `help` for commands.")?;
    render_page(out, &session.page(), &session.progress())?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(Exit::Quit);
        };

        let parsed = match Input::parse(&line) {
            Ok(parsed) => parsed,
            Err(err) => {
                writeln!(out, "{err}")?;
                continue;
            }
        };

        match parsed {
            Input::Answer { number, rating } => answer(session, out, number, Some(rating))?,
            Input::Clear { number } => answer(session, out, number, None)?,
            Input::Next => match session.advance() {
                Advance::AtLastPage => writeln!(out, "This is the last page, type `submit`.")?,
                Advance::Moved { .. } | Advance::Incomplete { .. } | Advance::Busy => {}
            },
            Input::Back => {
                if session.retreat() == Retreat::AtFirstPage {
                    writeln!(out, "Already on the first page.")?;
                }
            }
            Input::Submit => match service.submit(session).await {
                Ok(Submission::Submitted(result)) => return Ok(Exit::Submitted(result)),
                Ok(Submission::NotOnLastPage) => {
                    writeln!(out, "Go to the last page to submit.")?;
                }
                Ok(Submission::Incomplete { .. } | Submission::InFlight) => {}
                Ok(Submission::AlreadyDone) => return Ok(Exit::Quit),
                Err(err) => writeln!(out, "Could not save your answers: {err}")?,
            },
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Quit => return Ok(Exit::Quit),
        }

        drain_events(&mut events, session, out)?;
    }
}

fn answer<W: Write>(
    session: &mut SurveySession,
    out: &mut W,
    number: usize,
    rating: Option<Rating>,
) -> Result<(), SurfaceError> {
    let page = session.page();
    let Some(row) = page.questions.iter().find(|row| row.number == number) else {
        writeln!(out, "Question {number} is not on this page.")?;
        return Ok(());
    };
    session.set_answer(row.id, rating)?;
    Ok(())
}

fn drain_events<W: Write>(
    events: &mut broadcast::Receiver<SurveyEvent>,
    session: &SurveySession,
    out: &mut W,
) -> Result<(), SurfaceError> {
    let mut rerender = false;
    loop {
        match events.try_recv() {
            Ok(SurveyEvent::MustAnswerAll { missing }) => {
                writeln!(
                    out,
                    "!! Please answer all questions ({} missing).",
                    missing.len()
                )?;
                rerender = true;
            }
            Ok(SurveyEvent::PageChanged { .. }) => rerender = true,
            Ok(_) => {}
            Err(TryRecvError::Lagged(_)) => rerender = true,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    if rerender && !session.is_done() {
        render_page(out, &session.page(), &session.progress())?;
    }
    Ok(())
}

/// Print the questions of one page with their answers and error markers.
///
/// # Errors
///
/// Returns `io::Error` if writing fails.
pub fn render_page<W: Write>(
    out: &mut W,
    page: &PageView,
    progress: &SurveyProgress,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Page {} of {} ({} of {} answered, {} to go)",
        page.page,
        page.page_count.max(1),
        progress.answered,
        progress.total,
        progress.remaining()
    )?;
    writeln!(
        out,
        "  {} = {}, {} = {}",
        Rating::MIN,
        Rating::LOW_LABEL,
        Rating::MAX,
        Rating::HIGH_LABEL
    )?;
    for row in &page.questions {
        let answer = row
            .answer
            .map_or_else(|| " ".to_string(), |rating| rating.to_string());
        writeln!(out, "{:>3}. [{answer}] {}", row.number, row.text)?;
        if row.has_error {
            writeln!(out, "       ^ this question is required")?;
        }
    }

    let mut actions = Vec::new();
    if !page.is_first() {
        actions.push("back");
    }
    actions.push(if page.is_last() { "submit" } else { "next" });
    writeln!(out, "({})", actions.join(" | "))?;
    Ok(())
}

/// Print per-category totals, highest first.
///
/// # Errors
///
/// Returns `io::Error` if writing fails.
pub fn render_result<W: Write>(out: &mut W, result: &GiftResult) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Results")?;
    let width = result
        .iter()
        .map(|(category, _)| category.as_str().len())
        .max()
        .unwrap_or(0);
    for (category, total) in result.ranked() {
        writeln!(out, "  {:<width$}  {total}", category.as_str())?;
    }
    Ok(())
}
