//! `shelfscan` Core Library
//!
//! Shared functionality for `shelfscan` components:
//! - QR token shape checks, payload decoding and claims validation
//! - ISBN normalisation and validation
//! - Attendance hours, return days and due-date arithmetic
//! - Library opening hours
//! - Configuration resolution and common error types

pub mod config;
pub mod error;
pub mod isbn;
pub mod schedule;
pub mod token;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use schedule::{Hours, LibraryStatus, OpeningHours, ReturnDays};
pub use token::{Claims, RawToken, Role, TokenError};
