//! Return the book currently on loan.

use shelfscan_client::{ApiClient, ApiError, BorrowedBook};
use shelfscan_core::RawToken;
use tracing::{debug, info};

use super::{FlowOutcome, recheck};
use crate::feedback::Notifier;
use crate::prompt::{Prompt, PromptError};

pub const NOT_A_STUDENT: &str = "You are not a student";
pub const NOTHING_BORROWED: &str = "No borrowed books found.";
pub const FETCH_FAILED: &str = "Failed to fetch borrowed book.";
pub const RETURNED: &str = "Book returned successfully!";

pub struct ReturnFlow<'a, N: ?Sized, P: ?Sized> {
    api: &'a ApiClient,
    notifier: &'a N,
    prompt: &'a P,
}

impl<'a, N, P> ReturnFlow<'a, N, P>
where
    N: Notifier + ?Sized,
    P: Prompt + ?Sized,
{
    pub const fn new(api: &'a ApiClient, notifier: &'a N, prompt: &'a P) -> Self {
        Self {
            api,
            notifier,
            prompt,
        }
    }

    pub async fn run(&self, token: &RawToken) -> Result<FlowOutcome, PromptError> {
        let Some(scanned) = recheck(token) else {
            self.notifier.error(NOT_A_STUDENT);
            return Ok(FlowOutcome::Rejected);
        };

        let book = match self.api.borrowed(token.as_str()).await {
            Ok(resp) => match resp.books.filter(|_| resp.borrowed) {
                Some(book) => book,
                None => {
                    self.notifier.info(NOTHING_BORROWED);
                    return Ok(FlowOutcome::Completed);
                }
            },
            Err(e) => {
                debug!(error = %e, "borrowed check failed");
                self.notifier.error(FETCH_FAILED);
                return Ok(FlowOutcome::Failed);
            }
        };

        self.prompt.present(
            &format!("Return borrowed book {}", scanned.claims.fullname),
            &book_lines(&book),
        )?;

        loop {
            if !self.prompt.confirm("Return this book?").await? {
                return Ok(FlowOutcome::Cancelled);
            }
            match self.api.return_book(token.as_str(), &book.isbn).await {
                Ok(resp) => {
                    info!(isbn = %book.isbn, "book returned");
                    self.notifier
                        .success(resp.message.as_deref().unwrap_or(RETURNED));
                    return Ok(FlowOutcome::Completed);
                }
                Err(e) => self.notifier.error(&return_failure(&e)),
            }
        }
    }
}

fn book_lines(book: &BorrowedBook) -> Vec<String> {
    let mut lines = vec![format!("Title:   {}", book.bookname)];
    let authors = book.authors();
    if !authors.is_empty() {
        lines.push(format!("Authors: {}", authors.join(", ")));
    }
    lines.push(format!("ISBN:    {}", book.isbn));
    if let Some(date) = &book.borrowed_date {
        lines.push(format!("Borrowed on {}", borrowed_on(date)));
    }
    lines
}

/// Date part of a timestamp such as `2026-10-14T09:12:44`.
fn borrowed_on(timestamp: &str) -> &str {
    timestamp
        .split_once(['T', ' '])
        .map_or(timestamp, |(date, _)| date)
}

fn return_failure(error: &ApiError) -> String {
    match error {
        ApiError::Http(_) => "Failed to return book. Try again.".to_string(),
        _ => error.detail().unwrap_or("Return failed.").to_string(),
    }
}
