//! Claims carried in a token payload.

use std::fmt;

use serde_json::{Map, Value};

use super::TokenError;

const REQUIRED_FIELDS: [&str; 3] = ["fullname", "type", "srcode"];

/// Role of the token holder, resolved once when the claims are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    /// Librarian; routed to the admin view.
    Teacher,
}

impl Role {
    /// Exact, case-sensitive `type` tag the backend issues to librarians.
    pub const TEACHER_TAG: &'static str = "teacher";

    /// Anything other than the teacher tag is treated as a student.
    pub fn from_tag(tag: &str) -> Self {
        if tag == Self::TEACHER_TAG {
            Self::Teacher
        } else {
            Self::Student
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => Self::TEACHER_TAG,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Student/staff registration code.
    pub srcode: String,
    /// Display name.
    pub fullname: String,
    pub role: Role,
    /// Expiry (unix seconds). Informational only, never enforced here.
    pub exp: Option<i64>,
    /// Issued at (unix seconds).
    pub iat: Option<i64>,
}

impl Claims {
    /// Build typed claims from a decoded payload.
    ///
    /// `srcode`, `fullname` and `type` must be present and be strings.
    /// `exp`/`iat` are kept when they are integers and ignored otherwise.
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, TokenError> {
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(TokenError::InvalidClaims)
        };

        Ok(Self {
            srcode: field("srcode")?,
            fullname: field("fullname")?,
            role: Role::from_tag(&field("type")?),
            exp: payload.get("exp").and_then(Value::as_i64),
            iat: payload.get("iat").and_then(Value::as_i64),
        })
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }
}

/// Whether a decoded payload carries every required field as a string.
pub fn is_valid_claims(claims: Option<&Map<String, Value>>) -> bool {
    claims.is_some_and(|payload| {
        REQUIRED_FIELDS
            .iter()
            .all(|name| payload.get(*name).is_some_and(Value::is_string))
    })
}
