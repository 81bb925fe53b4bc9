//! shelfscan HTTP client.
//!
//! Provides a reqwest-based client for the attendance backend (attendance,
//! borrow, borrowed-check, return and admin reports) and for the Google
//! Books volumes API used to look up a book by ISBN.

mod books;
mod client;
mod error;
pub mod types;

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests;

pub use books::BooksClient;
pub use client::ApiClient;
pub use error::{ApiError, detail_message};
pub use types::{
    AttendanceRecord, BookInfo, BorrowRequest, BorrowedBook, BorrowedResponse, MessageResponse,
    StudentBorrows, StudentHours,
};
