//! Borrow a book: ISBN lookup, return period, confirmation.

use chrono::NaiveDate;
use shelfscan_client::{ApiClient, ApiError, BookInfo, BooksClient, BorrowRequest};
use shelfscan_core::schedule::due_date;
use shelfscan_core::{RawToken, isbn};
use tracing::{debug, info};

use super::{FlowOutcome, recheck};
use crate::feedback::Notifier;
use crate::prompt::{Prompt, PromptError};

pub const NOT_A_STUDENT: &str = "You are not a student";
pub const INVALID_ISBN: &str = "Invalid ISBN (10 or 13 digits).";
pub const BOOK_NOT_FOUND: &str = "Book not found.";
pub const LOOKUP_FAILED: &str = "Failed to fetch book info.";
pub const BORROWED: &str = "Book borrowed successfully.";
pub const BORROW_FAILED: &str = "Failed to borrow the book. Try again.";

pub struct BorrowFlow<'a, N: ?Sized, P: ?Sized> {
    api: &'a ApiClient,
    books: &'a BooksClient,
    notifier: &'a N,
    prompt: &'a P,
}

impl<'a, N, P> BorrowFlow<'a, N, P>
where
    N: Notifier + ?Sized,
    P: Prompt + ?Sized,
{
    pub const fn new(
        api: &'a ApiClient,
        books: &'a BooksClient,
        notifier: &'a N,
        prompt: &'a P,
    ) -> Self {
        Self {
            api,
            books,
            notifier,
            prompt,
        }
    }

    /// Run the borrow form until a book is borrowed or the user backs out.
    /// A server-side validation error resets the form to ISBN entry.
    pub async fn run(&self, token: &RawToken, today: NaiveDate) -> Result<FlowOutcome, PromptError> {
        let Some(scanned) = recheck(token) else {
            self.notifier.error(NOT_A_STUDENT);
            return Ok(FlowOutcome::Rejected);
        };
        info!(srcode = %scanned.claims.srcode, "borrow form opened");

        'form: loop {
            let Some(input) = self.prompt.read_isbn().await? else {
                return Ok(FlowOutcome::Cancelled);
            };
            let Some(book) = self.find_book(&input).await else {
                continue;
            };

            self.prompt.present(
                &format!("What book do you want to borrow? {}", scanned.claims.fullname),
                &book_lines(&book),
            )?;

            let Some(days) = self.prompt.choose_return_days(&book, today).await? else {
                continue;
            };
            let due = due_date(today, days);
            let request = BorrowRequest::new(token.as_str(), &book, days);

            loop {
                let question = format!(
                    "Borrow \"{}\" and return it by {}?",
                    book.title,
                    due.format("%A, %B %-d")
                );
                if !self.prompt.confirm(&question).await? {
                    continue 'form;
                }

                match self.api.borrow(&request).await {
                    Ok(resp) => {
                        info!(isbn = %request.isbn, days = days.get(), "book borrowed");
                        self.notifier
                            .success(resp.message.as_deref().unwrap_or(BORROWED));
                        return Ok(FlowOutcome::Completed);
                    }
                    Err(e) if e.is_bad_request() => {
                        self.notifier
                            .error(e.detail().unwrap_or("Invalid request."));
                        continue 'form;
                    }
                    Err(e) => self.notifier.error(&borrow_failure(&e)),
                }
            }
        }
    }

    async fn find_book(&self, input: &str) -> Option<BookInfo> {
        if !isbn::validate_isbn(&isbn::clean_isbn(input)) {
            self.notifier.error(INVALID_ISBN);
            return None;
        }
        match self.books.lookup(input).await {
            Ok(Some(book)) => Some(book),
            Ok(None) => {
                self.notifier.error(BOOK_NOT_FOUND);
                None
            }
            Err(ApiError::InvalidIsbn) => {
                self.notifier.error(INVALID_ISBN);
                None
            }
            Err(e) => {
                debug!(error = %e, "book lookup failed");
                self.notifier.error(LOOKUP_FAILED);
                None
            }
        }
    }
}

fn book_lines(book: &BookInfo) -> Vec<String> {
    let mut lines = vec![format!("Title:   {}", book.title)];
    if !book.authors.is_empty() {
        lines.push(format!("Authors: {}", book.authors.join(", ")));
    }
    lines.push(format!("ISBN:    {}", book.isbn));
    if let Some(thumbnail) = &book.thumbnail {
        lines.push(format!("Cover:   {thumbnail}"));
    }
    lines
}

fn borrow_failure(error: &ApiError) -> String {
    match error {
        ApiError::Api { .. } | ApiError::RateLimited => {
            error.detail().unwrap_or("Request failed.").to_string()
        }
        _ => BORROW_FAILED.to_string(),
    }
}
