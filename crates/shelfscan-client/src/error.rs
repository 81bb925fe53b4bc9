//! API client errors and server error-detail extraction.

use serde::Deserialize;
use thiserror::Error;

/// Errors from the attendance backend and book lookup.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429. An expected throttling signal rather than a failure.
    #[error("Rate limited by server")]
    RateLimited,

    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    /// A required request field was empty; nothing was sent.
    #[error("Missing {0}")]
    MissingField(&'static str),

    /// Not a 10- or 13-digit ISBN; nothing was sent.
    #[error("Invalid ISBN (10 or 13 digits).")]
    InvalidIsbn,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// HTTP status of a server-side rejection.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited => Some(429),
            _ => None,
        }
    }

    /// Server-provided detail message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Whether the server rejected the request contents (HTTP 400).
    pub const fn is_bad_request(&self) -> bool {
        matches!(self, Self::Api { status: 400, .. })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<ErrorDetail>,
}

/// `detail` as emitted by the backend: a plain string, a single validation
/// item, or a list of validation items.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Text(String),
    Item(DetailItem),
    Items(Vec<DetailItem>),
}

#[derive(Deserialize)]
struct DetailItem {
    msg: String,
}

/// Extract the human-readable message from an error response body.
pub fn detail_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed.detail? {
        ErrorDetail::Text(text) => Some(text),
        ErrorDetail::Item(item) => Some(item.msg),
        ErrorDetail::Items(items) => items.into_iter().next().map(|item| item.msg),
    };
    message.filter(|msg| !msg.trim().is_empty())
}
