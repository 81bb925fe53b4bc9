//! Interactive questions asked at the kiosk.
//!
//! Prompts read from the same [`LineInput`] as the scanner, so an answer is
//! always the next line typed (or scanned) after the question is shown.

use std::io::{self, Write};

use async_trait::async_trait;
use chrono::NaiveDate;
use shelfscan_client::BookInfo;
use shelfscan_core::schedule::due_date;
use shelfscan_core::{Hours, ReturnDays};
use thiserror::Error;

use crate::dispatch::StudentChoice;
use crate::input::LineInput;

#[derive(Debug, Error)]
pub enum PromptError {
    /// Input ended before an answer was given.
    #[error("input closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Questions the flows ask. `Ok(None)` means the user backed out.
#[async_trait(?Send)]
pub trait Prompt {
    async fn choose_action(&self, user_name: &str) -> Result<StudentChoice, PromptError>;

    async fn choose_hours(&self) -> Result<Option<Hours>, PromptError>;

    async fn read_isbn(&self) -> Result<Option<String>, PromptError>;

    async fn choose_return_days(
        &self,
        book: &BookInfo,
        today: NaiveDate,
    ) -> Result<Option<ReturnDays>, PromptError>;

    async fn confirm(&self, question: &str) -> Result<bool, PromptError>;

    /// Show a titled block of text.
    fn present(&self, title: &str, lines: &[String]) -> Result<(), PromptError>;
}

/// Answer to a numbered menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Item(usize),
    Cancel,
}

/// Parse a menu answer: `1..=len` picks an item, `c`/`q`/`0` cancels.
pub fn parse_selection(line: &str, len: usize) -> Option<Selection> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("c") || line.eq_ignore_ascii_case("q") || line == "0" {
        return Some(Selection::Cancel);
    }
    let n: usize = line.parse().ok()?;
    (1..=len).contains(&n).then_some(Selection::Item(n - 1))
}

/// Parse a yes/no answer. Blank counts as no.
pub fn parse_confirm(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompts on stdout, answers from the shared terminal input.
#[derive(Debug, Clone)]
pub struct ConsolePrompt {
    input: LineInput,
}

impl ConsolePrompt {
    pub const fn new(input: LineInput) -> Self {
        Self { input }
    }

    async fn read_line(&self) -> Result<String, PromptError> {
        self.input.next_line().await.ok_or(PromptError::Closed)
    }

    async fn select(&self, title: &str, items: &[String]) -> Result<Selection, PromptError> {
        {
            let mut out = io::stdout().lock();
            writeln!(out, "\n{title}")?;
            for (i, item) in items.iter().enumerate() {
                writeln!(out, "  {}) {item}", i + 1)?;
            }
            write!(out, "Choose [1-{}, c to cancel]: ", items.len())?;
            out.flush()?;
        }

        loop {
            let line = self.read_line().await?;
            if let Some(selection) = parse_selection(&line, items.len()) {
                return Ok(selection);
            }
            let mut out = io::stdout().lock();
            write!(out, "Please enter a number between 1 and {}: ", items.len())?;
            out.flush()?;
        }
    }
}

#[async_trait(?Send)]
impl Prompt for ConsolePrompt {
    async fn choose_action(&self, user_name: &str) -> Result<StudentChoice, PromptError> {
        let items: Vec<String> = StudentChoice::ALL
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        let title = format!("Hello {user_name}, what would you like to do?");
        Ok(match self.select(&title, &items).await? {
            Selection::Item(i) => StudentChoice::ALL
                .get(i)
                .copied()
                .unwrap_or(StudentChoice::Cancel),
            Selection::Cancel => StudentChoice::Cancel,
        })
    }

    async fn choose_hours(&self) -> Result<Option<Hours>, PromptError> {
        let choices: Vec<Hours> = Hours::choices().collect();
        let items: Vec<String> = choices.iter().map(ToString::to_string).collect();
        Ok(match self.select("How many hours will you stay?", &items).await? {
            Selection::Item(i) => choices.get(i).copied(),
            Selection::Cancel => None,
        })
    }

    async fn read_isbn(&self) -> Result<Option<String>, PromptError> {
        {
            let mut out = io::stdout().lock();
            write!(out, "\nScan or type the book ISBN (blank to cancel): ")?;
            out.flush()?;
        }
        let line = self.read_line().await?;
        let line = line.trim();
        Ok((!line.is_empty()).then(|| line.to_string()))
    }

    async fn choose_return_days(
        &self,
        book: &BookInfo,
        today: NaiveDate,
    ) -> Result<Option<ReturnDays>, PromptError> {
        let choices: Vec<ReturnDays> = ReturnDays::choices().collect();
        let items: Vec<String> = choices
            .iter()
            .map(|d| {
                let unit = if d.get() == 1 { "day" } else { "days" };
                let due = due_date(today, *d);
                format!("{d} {unit} (due {})", due.format("%a %Y-%m-%d"))
            })
            .collect();
        let title = format!("Return \"{}\" within:", book.title);
        Ok(match self.select(&title, &items).await? {
            Selection::Item(i) => choices.get(i).copied(),
            Selection::Cancel => None,
        })
    }

    async fn confirm(&self, question: &str) -> Result<bool, PromptError> {
        {
            let mut out = io::stdout().lock();
            write!(out, "{question} [y/N]: ")?;
            out.flush()?;
        }
        loop {
            let line = self.read_line().await?;
            if let Some(answer) = parse_confirm(&line) {
                return Ok(answer);
            }
            let mut out = io::stdout().lock();
            write!(out, "Please answer y or n: ")?;
            out.flush()?;
        }
    }

    fn present(&self, title: &str, lines: &[String]) -> Result<(), PromptError> {
        let mut out = io::stdout().lock();
        writeln!(out, "\n{title}")?;
        writeln!(out, "{}", "-".repeat(title.chars().count()))?;
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        Ok(())
    }
}
