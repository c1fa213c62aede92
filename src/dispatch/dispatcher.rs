//! The request dispatcher.
//!
//! # Responsibilities
//! - Build the effective address and merged headers for one request
//! - Hand the request to the transport and race it against the deadline
//! - Resolve the caller exactly once with a `ResponseEnvelope`
//!
//! # State
//! ```text
//! Pending ──transport loaded──▶ Completed (envelope from server response)
//! Pending ──transport failed──▶ Completed ("Failed to make request.")
//! Pending ──deadline passed───▶ Completed ("Request took longer than expected.")
//! ```

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use thiserror::Error;
use tracing::Instrument;

use crate::config::{DispatchConfig, EndpointConfig};
use crate::http::{
    with_query, EffectiveOptions, Method, RequestBuilder, RequestDescriptor, RequestError,
    RequestId, ResolvedDefaults, ResponseEnvelope,
};
use crate::observability::metrics::{self, Outcome};
use crate::resilience::{settle_within, Settled};
use crate::transport::{
    HttpTransport, Transport, TransportFailure, TransportOutcome, TransportRequest,
};

/// Errors raised while constructing a dispatcher.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid default headers: {0}")]
    Defaults(#[from] RequestError),

    #[error("HTTP client could not be built: {0}")]
    Client(#[from] reqwest::Error),
}

/// Issues requests and resolves each one exactly once.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    defaults: ResolvedDefaults,
    endpoints: EndpointConfig,
}

impl Dispatcher {
    /// Create a dispatcher backed by a reqwest client.
    pub fn new(config: &DispatchConfig) -> Result<Self, SetupError> {
        let transport = HttpTransport::new(&config.transport)?;
        Self::with_transport(config, transport)
    }

    /// Create a dispatcher over any transport.
    pub fn with_transport<T>(config: &DispatchConfig, transport: T) -> Result<Self, SetupError>
    where
        T: Transport + 'static,
    {
        Ok(Self {
            transport: Arc::new(transport),
            defaults: ResolvedDefaults::new(&config.defaults)?,
            endpoints: config.endpoints.clone(),
        })
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    pub fn request(&self, method: Method, target: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, target)
    }

    pub fn get(&self, target: impl Into<String>) -> RequestBuilder {
        RequestBuilder::get(target)
    }

    pub fn post(&self, target: impl Into<String>) -> RequestBuilder {
        RequestBuilder::post(target)
    }

    /// Build the request against this dispatcher's endpoints and dispatch it.
    pub async fn send(&self, builder: RequestBuilder) -> Result<ResponseEnvelope, RequestError> {
        let descriptor = builder.build(&self.endpoints)?;
        Ok(self.dispatch(&descriptor).await)
    }

    /// Issue one request.
    ///
    /// Never fails: HTTP errors, transport failures and timeouts all come back
    /// as an envelope with `ok() == false`.
    pub async fn dispatch(&self, descriptor: &RequestDescriptor) -> ResponseEnvelope {
        let request_id = RequestId::new();
        let address = with_query(descriptor.address(), descriptor.query());
        let span = tracing::info_span!(
            "dispatch",
            request_id = %request_id,
            method = %descriptor.method(),
            url = %address,
        );

        self.run(descriptor, address).instrument(span).await
    }

    async fn run(&self, descriptor: &RequestDescriptor, address: String) -> ResponseEnvelope {
        let started = Instant::now();
        let options = descriptor.options().merged_over(&self.defaults);
        let deadline = options.deadline;
        let policy = options.timeout_policy;

        // Not reached for descriptors from `build`: the address was parsed
        // there and an encoded query cannot break it.
        let request = match prepare(descriptor, &address, options) {
            Ok(request) => request,
            Err(failure) => {
                tracing::warn!(reason = %failure.reason, "Request could not be prepared");
                metrics::record_dispatch(descriptor.method(), Outcome::TransportError, started.elapsed());
                return ResponseEnvelope::from_failure(&failure);
            }
        };

        tracing::debug!(
            timeout_ms = deadline.limit().map(|d| d.as_millis() as u64),
            policy = ?policy,
            has_body = request.body.is_some(),
            "Sending request"
        );

        let in_flight = self
            .transport
            .send(request)
            .instrument(tracing::Span::current());

        let (envelope, outcome) = match settle_within(in_flight, deadline, policy).await {
            Settled::Completed(TransportOutcome::Loaded(response)) => {
                let envelope = ResponseEnvelope::from_response(response);
                let outcome = if envelope.ok() {
                    Outcome::Success
                } else {
                    Outcome::HttpError
                };
                tracing::info!(
                    status = envelope.status(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Request completed"
                );
                (envelope, outcome)
            }
            Settled::Completed(TransportOutcome::Failed(failure)) => {
                tracing::warn!(
                    reason = %failure.reason,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Request failed at transport level"
                );
                (ResponseEnvelope::from_failure(&failure), Outcome::TransportError)
            }
            Settled::TimedOut => {
                tracing::warn!(
                    timeout_ms = deadline.limit().map(|d| d.as_millis() as u64),
                    policy = ?policy,
                    "Request timed out"
                );
                (ResponseEnvelope::timed_out(), Outcome::Timeout)
            }
        };

        metrics::record_dispatch(descriptor.method(), outcome, started.elapsed());
        envelope
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("defaults", &self.defaults)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

/// Turn a descriptor plus merged options into a transport request.
///
/// Only the URL parse can fail. The payload is already a `Value`, so writing
/// it out cannot.
fn prepare(
    descriptor: &RequestDescriptor,
    address: &str,
    options: EffectiveOptions,
) -> Result<TransportRequest, TransportFailure> {
    let url = url::Url::parse(address)
        .map_err(|e| TransportFailure::new(format!("invalid address '{}': {}", address, e)))?;

    let mut headers = options.headers;
    if options.ignore_cache {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    }

    let body = match descriptor.payload() {
        Some(payload) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Some(payload.to_string().into_bytes())
        }
        None => None,
    };

    Ok(TransportRequest {
        method: descriptor.method(),
        url,
        headers,
        body,
    })
}
