//! Views reached from a scan: borrow, return and the librarian dashboard.
//!
//! Each flow takes the token from its [`Route`](crate::dispatch::Route),
//! re-checks it, and runs to completion before control goes back to the
//! scanner.

pub mod admin;
pub mod borrow;
pub mod return_book;

use shelfscan_core::token::{self, ScannedToken};
use shelfscan_core::RawToken;

/// How a flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    Cancelled,
    /// The token did not belong in this view.
    Rejected,
    Failed,
}

/// Re-run the token intake for a routed token.
pub(crate) fn recheck(token: &RawToken) -> Option<ScannedToken> {
    token::validate(token.as_str()).ok()
}
