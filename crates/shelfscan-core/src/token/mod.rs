//! QR token intake.
//!
//! A scanned QR code carries a three-part signed token issued by the
//! attendance backend. Intake runs in three steps: a structural shape check,
//! decoding of the payload segment, and validation of the required claims.
//!
//! The signature segment is never verified here. There is no secret on the
//! client, and the backend re-validates the token on every API call, so a
//! successfully decoded token is not proof of authenticity.

mod claims;
mod decode;
mod shape;

use thiserror::Error;

pub use claims::{is_valid_claims, Claims, Role};
pub use decode::{decode, decode_claims};
pub use shape::{is_well_formed, RawToken};

/// Why a scanned token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not shaped like `segment.segment.<43-char signature>`.
    #[error("Invalid token")]
    Malformed,

    /// Payload could not be decoded or lacks `srcode`/`fullname`/`type`.
    #[error("Invalid Qr Code")]
    InvalidClaims,
}

/// A token that passed the shape check together with its validated claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedToken {
    pub token: RawToken,
    pub claims: Claims,
}

/// Run the full intake pipeline on a raw scanned string.
pub fn validate(raw: &str) -> Result<ScannedToken, TokenError> {
    let token = RawToken::parse(raw)?;
    let payload = decode(token.as_str()).ok_or(TokenError::InvalidClaims)?;
    let claims = Claims::from_payload(&payload)?;
    Ok(ScannedToken { token, claims })
}

/// Token builders for tests. Signatures are filler, never real.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    /// `{"alg":"HS256","typ":"JWT"}`
    pub const HEADER: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";

    /// 43 URL-safe base64 characters.
    pub const SIGNATURE: &str = "SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

    /// Build a well-formed token around an arbitrary JSON payload.
    pub fn make_token(payload: &serde_json::Value) -> String {
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{HEADER}.{body}.{SIGNATURE}")
    }

    pub fn student_token(srcode: &str, fullname: &str) -> String {
        make_token(&serde_json::json!({
            "srcode": srcode,
            "fullname": fullname,
            "type": "student",
        }))
    }

    pub fn teacher_token(srcode: &str, fullname: &str) -> String {
        make_token(&serde_json::json!({
            "srcode": srcode,
            "fullname": fullname,
            "type": "teacher",
        }))
    }
}
