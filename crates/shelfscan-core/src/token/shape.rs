//! Structural pre-filter for scanned tokens.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::TokenError;

/// Two URL-safe base64 segments followed by a 43-character signature
/// (an HS256 digest encoded without padding).
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]{43}$")
        .expect("static regex is valid")
});

/// Whether `token` looks like a three-part signed token. Nothing is decoded.
pub fn is_well_formed(token: &str) -> bool {
    TOKEN_RE.is_match(token)
}

/// A token string known to pass [`is_well_formed`].
///
/// The token doubles as the routing key for the borrow, return and admin
/// views, so it is carried around as-is and never persisted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawToken(String);

impl RawToken {
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        if is_well_formed(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(TokenError::Malformed)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Short, log-safe prefix of the token.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl FromStr for RawToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keep full tokens out of `{:?}` output and structured logs.
impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawToken({}…)", self.short())
    }
}

impl AsRef<str> for RawToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
