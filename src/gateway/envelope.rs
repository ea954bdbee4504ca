//! Response envelope shared by every backend endpoint.
//!
//! Wire shape: `{ "success": bool, "code"?: string|number, "message"?: string, "data": any }`.
//! Bodies that do not match are treated as an ordinary failure.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Backend code for a request made without a session.
pub const USER_NOT_LOGIN: &str = "USER_NOT_LOGIN";
/// Backend code for a session whose token has expired.
pub const USER_AUTH_EXPIRED: &str = "USER_AUTH_EXPIRED";

pub const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";
pub const DEFAULT_NETWORK_MESSAGE: &str = "Network error";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, deserialize_with = "code_as_string")]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Some backends send numeric codes; keep them as their decimal text.
fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(code)) => Some(code),
        Some(other) => Some(other.to_string()),
    })
}

/// An application-level failure (`success: false`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: Option<String>,
    pub message: String,
}

impl Rejection {
    /// True when the backend says the session is missing or expired.
    #[must_use]
    pub fn is_session_expiry(&self) -> bool {
        matches!(self.code.as_deref(), Some(USER_NOT_LOGIN | USER_AUTH_EXPIRED))
    }

    fn malformed() -> Self {
        Self { code: None, message: DEFAULT_FAILURE_MESSAGE.to_owned() }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Rejected(Rejection),
}

/// Classify a transport-successful response body.
#[must_use]
pub fn unwrap_envelope(body: &str) -> Outcome {
    let Ok(envelope) = serde_json::from_str::<Envelope>(body) else {
        return Outcome::Rejected(Rejection::malformed());
    };
    if envelope.success {
        return Outcome::Success(envelope.data);
    }
    let message = envelope
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_owned());
    Outcome::Rejected(Rejection { code: envelope.code, message })
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod envelope_test;
