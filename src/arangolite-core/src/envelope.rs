//! Embedded error detection, the first of the two decode phases.

use serde::Deserialize;

/// Minimal error shape the server may embed in any JSON object body.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: bool,
    #[serde(default, rename = "errorNum")]
    error_num: Option<i64>,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

/// Structured error fields pulled out of a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedError {
    pub error_num: i64,
    pub message: String,
}

/// `Some` only for a JSON object that parses as the envelope with
/// `error: true`. Arrays, scalars, non-JSON and `error: false` are all a
/// clean negative.
pub fn embedded_error(body: &[u8]) -> Option<EmbeddedError> {
    let first = body.iter().find(|b| !b.is_ascii_whitespace())?;
    if *first != b'{' {
        return None;
    }
    let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
    if !envelope.error {
        return None;
    }
    Some(EmbeddedError {
        error_num: envelope.error_num.unwrap_or_default(),
        message: envelope.error_message.unwrap_or_default(),
    })
}
