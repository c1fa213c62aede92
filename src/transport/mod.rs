//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher
//!     → TransportRequest (method, effective URL, headers, optional JSON bytes)
//!     → Transport::send (http.rs: reqwest client)
//!     → TransportOutcome::Loaded | TransportOutcome::Failed
//!     → ResponseEnvelope
//! ```
//!
//! # Design Decisions
//! - The transport reports exactly one outcome per request
//! - HTTP error statuses are `Loaded`; only network-level problems are `Failed`
//! - Returned futures are `'static + Send` so they can outlive the caller on timeout

use std::sync::Arc;

use futures_util::future::BoxFuture;
use reqwest::header::HeaderMap;
use url::Url;

use crate::http::Method;

pub mod http;

pub use http::HttpTransport;

/// A fully prepared outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Final state of a request the server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty for non-standard codes.
    ///
    /// This is derived from the code, not read off the wire: reqwest does not
    /// expose the phrase the server sent, so a `299 Custom` status line yields
    /// `""` here.
    pub status_text: String,
    /// Headers as `name: value\r\n` lines.
    pub headers: String,
    pub body: String,
}

/// A network-level failure: the server never produced a complete response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub status: u16,
    pub status_text: String,
    /// Diagnostic detail for logs. Never shown to the caller.
    pub reason: String,
}

impl TransportFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            status: 0,
            status_text: String::new(),
            reason: reason.into(),
        }
    }
}

/// What the transport reports once a request settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    Loaded(TransportResponse),
    Failed(TransportFailure),
}

/// Issues one outbound HTTP request.
pub trait Transport: Send + Sync {
    fn send(&self, request: TransportRequest) -> BoxFuture<'static, TransportOutcome>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: TransportRequest) -> BoxFuture<'static, TransportOutcome> {
        (**self).send(request)
    }
}
