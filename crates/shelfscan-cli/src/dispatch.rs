//! Turns a detected payload into a routing decision.

use std::fmt;

use shelfscan_core::token::{self, ScannedToken};
use shelfscan_core::{Claims, RawToken, Role, TokenError};
use tracing::{debug, info};

use crate::feedback::Level;

/// A student's token paired with their display name, alive only until the
/// next choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub token: RawToken,
    pub user_name: String,
}

/// Navigation target that leaves the scan view. The token travels inside
/// the route; nothing else holds it.
#[derive(Clone, PartialEq, Eq)]
pub enum Route {
    Admin(RawToken),
    Borrow(RawToken),
    Return(RawToken),
}

impl Route {
    pub const fn token(&self) -> &RawToken {
        match self {
            Self::Admin(t) | Self::Borrow(t) | Self::Return(t) => t,
        }
    }

    const fn prefix(&self) -> &'static str {
        match self {
            Self::Admin(_) => "/admin/",
            Self::Borrow(_) => "/borrow/",
            Self::Return(_) => "/return/",
        }
    }

    /// Full path, token included.
    pub fn path(&self) -> String {
        format!("{}{}", self.prefix(), self.token())
    }

    /// Parse `/admin/<token>`, `/borrow/<token>` or `/return/<token>`.
    pub fn parse_path(path: &str) -> Result<Self, TokenError> {
        let (kind, rest) = path
            .trim_start_matches('/')
            .split_once('/')
            .ok_or(TokenError::Malformed)?;
        let token = RawToken::parse(rest)?;
        match kind {
            "admin" => Ok(Self::Admin(token)),
            "borrow" => Ok(Self::Borrow(token)),
            "return" => Ok(Self::Return(token)),
            _ => Err(TokenError::Malformed),
        }
    }
}

// Logs get the route kind and a token prefix only.
impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}…", self.prefix(), self.token().short())
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route({self})")
    }
}

/// Outcome of validating one detected payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Rejected(TokenError),
    Teacher { token: RawToken, claims: Claims },
    Student(ScanResult),
}

impl Dispatch {
    pub fn from_payload(raw: &str) -> Self {
        match token::validate(raw) {
            Ok(ScannedToken { claims, .. }) if claims.fullname.trim().is_empty() => {
                debug!(srcode = %claims.srcode, "scanned code has no display name");
                Self::Rejected(TokenError::InvalidClaims)
            }
            Ok(ScannedToken { token, claims }) => match claims.role {
                Role::Teacher => {
                    info!(srcode = %claims.srcode, "librarian scanned");
                    Self::Teacher { token, claims }
                }
                Role::Student => {
                    info!(srcode = %claims.srcode, "student scanned");
                    Self::Student(ScanResult {
                        token,
                        user_name: claims.fullname,
                    })
                }
            },
            Err(e) => {
                debug!(error = %e, "scanned code rejected");
                Self::Rejected(e)
            }
        }
    }
}

/// Notice shown when a scanned code is refused. A readable token with
/// unusable claims is only a warning.
pub const fn rejection_notice(error: TokenError) -> (Level, &'static str) {
    match error {
        TokenError::Malformed => (Level::Error, "Invalid token"),
        TokenError::InvalidClaims => (Level::Warning, "Invalid token: missing user info."),
    }
}

/// What a student picked after a successful scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentChoice {
    Attendance,
    Borrow,
    Return,
    Cancel,
}

impl StudentChoice {
    pub const ALL: [Self; 4] = [Self::Attendance, Self::Borrow, Self::Return, Self::Cancel];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Attendance => "Attendance",
            Self::Borrow => "Borrow Book",
            Self::Return => "Return Book",
            Self::Cancel => "Cancel",
        }
    }
}
