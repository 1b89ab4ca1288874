//! Human-in-the-loop criterion review.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use reqcheck_core::{Criterion, Decision, ReqcheckError, Result};

/// Shown when an answer is neither `y` nor `n`.
pub const RETRY_PROMPT: &str =
    "Please enter either 'y' or 'n' to select if the criterion should be included: ";

const TERMINAL: &str = "<terminal>";

/// Position of a criterion within one review session.
#[derive(Debug, Clone, Copy)]
pub struct ReviewContext<'a> {
    pub subject: &'a str,
    pub model: &'a str,
    /// Zero-based index of the criterion being reviewed.
    pub index: usize,
    pub total: usize,
}

/// Decides, one criterion at a time, which generated criteria are kept.
pub trait CriteriaReviewer {
    /// Return a decision for `criterion`. Never defaults: an implementation
    /// that cannot obtain a decision must fail.
    fn review(&mut self, context: &ReviewContext<'_>, criterion: &Criterion) -> Result<Decision>;
}

/// Interactive reviewer reading `y`/`n` answers line by line.
pub struct TerminalReviewer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "{text}")?;
        self.output.flush()
    }

    fn read_answer(&mut self) -> Result<Decision> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| ReqcheckError::io(TERMINAL, e))?;
            if read == 0 {
                return Err(input_exhausted());
            }
            if let Some(decision) = parse_answer(&line) {
                return Ok(decision);
            }
            self.prompt(RETRY_PROMPT)
                .map_err(|e| ReqcheckError::io(TERMINAL, e))?;
        }
    }
}

impl<R: BufRead, W: Write> CriteriaReviewer for TerminalReviewer<R, W> {
    fn review(&mut self, context: &ReviewContext<'_>, criterion: &Criterion) -> Result<Decision> {
        if context.index == 0 {
            writeln!(
                self.output,
                "\nReviewing {} criteria for subject '{}' (model '{}')",
                context.total, context.subject, context.model
            )
            .map_err(|e| ReqcheckError::io(TERMINAL, e))?;
        }
        self.prompt(&format!(
            "{}: {} (y/n): ",
            criterion.title, criterion.explanation
        ))
        .map_err(|e| ReqcheckError::io(TERMINAL, e))?;
        self.read_answer()
    }
}

/// Replays a fixed list of decisions in order.
#[derive(Debug, Default)]
pub struct ScriptedReviewer {
    decisions: VecDeque<Decision>,
}

impl ScriptedReviewer {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
        }
    }

    /// Decisions not consumed yet.
    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }
}

impl CriteriaReviewer for ScriptedReviewer {
    fn review(&mut self, _context: &ReviewContext<'_>, _criterion: &Criterion) -> Result<Decision> {
        self.decisions.pop_front().ok_or_else(input_exhausted)
    }
}

fn parse_answer(line: &str) -> Option<Decision> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" => Some(Decision::Include),
        "n" => Some(Decision::Exclude),
        _ => None,
    }
}

fn input_exhausted() -> ReqcheckError {
    ReqcheckError::io(
        TERMINAL,
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "review input ended before every criterion was decided",
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(index: usize) -> ReviewContext<'static> {
        ReviewContext {
            subject: "shop",
            model: "mock-1",
            index,
            total: 2,
        }
    }

    fn criterion() -> Criterion {
        Criterion::new("Short title", "Fits in one line.")
    }

    #[test]
    fn accepts_either_case() {
        let mut reviewer = TerminalReviewer::new("Y\nn\n".as_bytes(), Vec::new());
        assert_eq!(
            reviewer.review(&context(0), &criterion()).unwrap(),
            Decision::Include
        );
        assert_eq!(
            reviewer.review(&context(1), &criterion()).unwrap(),
            Decision::Exclude
        );

        let output = String::from_utf8(reviewer.into_output()).unwrap();
        assert!(output.contains("subject 'shop'"));
        assert!(output.contains("Short title: Fits in one line. (y/n): "));
    }

    #[test]
    fn invalid_answers_are_reprompted() {
        let mut reviewer = TerminalReviewer::new("maybe\n\nyes\nn\n".as_bytes(), Vec::new());
        assert_eq!(
            reviewer.review(&context(0), &criterion()).unwrap(),
            Decision::Exclude
        );
        let output = String::from_utf8(reviewer.into_output()).unwrap();
        assert_eq!(output.matches(RETRY_PROMPT).count(), 3);
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut reviewer = TerminalReviewer::new("x\n".as_bytes(), Vec::new());
        let err = reviewer.review(&context(0), &criterion()).unwrap_err();
        assert!(matches!(err, ReqcheckError::Io { .. }));
    }

    #[test]
    fn scripted_replays_in_order() {
        let mut reviewer = ScriptedReviewer::new([Decision::Exclude, Decision::Include]);
        assert_eq!(
            reviewer.review(&context(0), &criterion()).unwrap(),
            Decision::Exclude
        );
        assert_eq!(reviewer.remaining(), 1);
        assert_eq!(
            reviewer.review(&context(1), &criterion()).unwrap(),
            Decision::Include
        );
        assert!(reviewer.review(&context(2), &criterion()).is_err());
    }
}
