//! Normalized response envelope.
//!
//! # Responsibilities
//! - Carry status, status text, raw header blob and raw body text
//! - Derive the success flag once, at construction
//! - Represent transport failures and timeouts in the same shape
//!
//! # Design Decisions
//! - Fields are private; the success flag can never drift from the status
//! - Body is kept as text; JSON parsing happens only when asked for

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::transport::{TransportFailure, TransportResponse};

/// Body placed in the envelope when the transport fails.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to make request.";

/// Body placed in the envelope when the timer wins the race.
pub const TIMEOUT_MESSAGE: &str = "Request took longer than expected.";

/// The result of one dispatch. Never an error; check [`ResponseEnvelope::ok`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    ok: bool,
    status: u16,
    status_text: String,
    headers: String,
    data: String,
}

impl ResponseEnvelope {
    /// Envelope for a response the server actually sent.
    pub fn from_response(response: TransportResponse) -> Self {
        Self {
            ok: is_success(response.status),
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            data: response.body,
        }
    }

    /// Envelope for a transport-level failure.
    pub fn from_failure(failure: &TransportFailure) -> Self {
        Self::failure(failure.status, failure.status_text.clone(), TRANSPORT_FAILURE_MESSAGE)
    }

    /// Envelope for a client-side timeout.
    pub fn timed_out() -> Self {
        Self::failure(0, String::new(), TIMEOUT_MESSAGE)
    }

    fn failure(status: u16, status_text: String, message: &str) -> Self {
        Self {
            ok: false,
            status,
            status_text,
            headers: String::new(),
            data: message.to_string(),
        }
    }

    /// True when the status was in `[200, 300)` and the server answered.
    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Response headers as `name: value\r\n` lines.
    pub fn headers(&self) -> &str {
        &self.headers
    }

    /// Look up a header in the raw blob, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.split("\r\n").find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    /// Raw body text, or the failure message for synthetic envelopes.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status,
            status_text: "Whatever".into(),
            headers: "content-type: application/json\r\nx-trace: abc\r\n".into(),
            body: body.into(),
        }
    }

    #[test]
    fn test_success_range() {
        for status in [200, 201, 204, 299] {
            assert!(ResponseEnvelope::from_response(response(status, "")).ok(), "{}", status);
        }
        for status in [0, 100, 199, 300, 304, 404, 500] {
            assert!(!ResponseEnvelope::from_response(response(status, "")).ok(), "{}", status);
        }
    }

    #[test]
    fn test_json_accessor() {
        #[derive(Deserialize)]
        struct Player {
            name: String,
            floor: u32,
        }

        let env = ResponseEnvelope::from_response(response(200, r#"{"name":"HWANG","floor":1000}"#));
        let player: Player = env.json().unwrap();
        assert_eq!(player.name, "HWANG");
        assert_eq!(player.floor, 1000);

        let env = ResponseEnvelope::from_response(response(200, "not json"));
        assert!(env.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_header_lookup() {
        let env = ResponseEnvelope::from_response(response(200, ""));
        assert_eq!(env.header("Content-Type"), Some("application/json"));
        assert_eq!(env.header("X-TRACE"), Some("abc"));
        assert_eq!(env.header("missing"), None);
    }

    #[test]
    fn test_synthetic_envelopes() {
        let env = ResponseEnvelope::timed_out();
        assert!(!env.ok());
        assert_eq!(env.status(), 0);
        assert_eq!(env.data(), TIMEOUT_MESSAGE);

        let env = ResponseEnvelope::from_failure(&TransportFailure::new("connection refused"));
        assert!(!env.ok());
        assert_eq!(env.status(), 0);
        assert_eq!(env.status_text(), "");
        assert_eq!(env.data(), TRANSPORT_FAILURE_MESSAGE);
        assert_eq!(env.headers(), "");
    }
}
