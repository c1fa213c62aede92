//! Metrics collection.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatches by method, outcome
//! - `dispatch_request_duration_seconds` (histogram): time until the caller was resolved
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding application installs a recorder
//! - Without a recorder every call is a no-op

use std::time::Duration;

use crate::http::Method;

/// How a dispatch resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Status in `[200, 300)`.
    Success,
    /// The server answered with any other status.
    HttpError,
    TransportError,
    Timeout,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::HttpError => "http_error",
            Outcome::TransportError => "transport_error",
            Outcome::Timeout => "timeout",
        }
    }
}

/// Record one resolved dispatch.
pub fn record_dispatch(method: Method, outcome: Outcome, elapsed: Duration) {
    metrics::counter!(
        "dispatch_requests_total",
        "method" => method.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    metrics::histogram!(
        "dispatch_request_duration_seconds",
        "outcome" => outcome.as_str()
    )
    .record(elapsed.as_secs_f64());
}
