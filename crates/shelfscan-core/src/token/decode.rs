//! Payload extraction. No signature or expiry checks happen here.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};
use tracing::debug;

use super::Claims;

/// base64url, with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the payload (second) segment of `token` into a JSON object.
///
/// Fails closed: a missing segment, bad base64, invalid UTF-8, non-JSON or a
/// JSON value that is not an object all yield `None`.
pub fn decode(token: &str) -> Option<Map<String, Value>> {
    let Some(segment) = token.split('.').nth(1) else {
        debug!("token has no payload segment");
        return None;
    };

    let bytes = match PAYLOAD_ENGINE.decode(segment) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "token payload is not base64url");
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            debug!(kind = json_kind(&other), "token payload is not a JSON object");
            None
        }
        Err(e) => {
            debug!(error = %e, "token payload is not JSON");
            None
        }
    }
}

/// Decode and validate in one step.
pub fn decode_claims(token: &str) -> Option<Claims> {
    decode(token).and_then(|payload| Claims::from_payload(&payload).ok())
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
