//! shelfscan CLI Library
//!
//! Kiosk front-end for the library attendance backend: samples a scanner
//! for QR tokens, dispatches students to attendance/borrow/return and
//! librarians to the admin view.

pub mod attendance;
pub mod capture;
pub mod dispatch;
pub mod feedback;
pub mod flows;
pub mod input;
pub mod prompt;
pub mod scan;
