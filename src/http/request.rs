//! Request description and construction.
//!
//! # Responsibilities
//! - Define the immutable `RequestDescriptor` handed to the dispatcher
//! - Build descriptors incrementally (method first, then path, params, headers)
//! - Resolve relative targets against the configured phase endpoint
//! - Merge per-request options over configured defaults
//!
//! # Design Decisions
//! - Malformed input (address, header, body) fails at build time, never at dispatch
//! - A caller-supplied header mapping replaces the default mapping as a whole
//! - Options are merged functionally; configured defaults are never mutated

use std::fmt;
use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{EndpointConfig, Phase, RequestDefaults, TimeoutPolicy};
use crate::http::query::QueryParams;
use crate::resilience::timeouts::Deadline;

/// Errors raised while building a request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid request address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: url::ParseError,
    },

    #[error("No endpoint configured for phase {0:?}")]
    MissingEndpoint(Phase),

    #[error("Invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("Invalid value for header '{0}'")]
    InvalidHeaderValue(String),

    #[error("Request body could not be serialized: {0}")]
    Body(#[from] serde_json::Error),
}

/// Supported request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(format!("unsupported method '{}'", other)),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// Per-request overrides. `None` falls back to the configured default.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub ignore_cache: Option<bool>,
    pub headers: Option<HeaderMap>,
    pub timeout_ms: Option<i64>,
    pub timeout_policy: Option<TimeoutPolicy>,
}

/// Options after merging over defaults.
#[derive(Debug, Clone)]
pub struct EffectiveOptions {
    pub ignore_cache: bool,
    pub headers: HeaderMap,
    pub deadline: Deadline,
    pub timeout_policy: TimeoutPolicy,
}

/// Configured defaults with headers already converted to a `HeaderMap`.
#[derive(Debug, Clone)]
pub struct ResolvedDefaults {
    ignore_cache: bool,
    headers: HeaderMap,
    timeout_ms: i64,
    timeout_policy: TimeoutPolicy,
}

impl ResolvedDefaults {
    pub fn new(defaults: &RequestDefaults) -> Result<Self, RequestError> {
        Ok(Self {
            ignore_cache: defaults.ignore_cache,
            headers: header_map(defaults.headers.iter())?,
            timeout_ms: defaults.timeout_ms,
            timeout_policy: defaults.timeout_policy,
        })
    }
}

impl RequestOptions {
    /// Merge these options over `defaults`.
    pub fn merged_over(&self, defaults: &ResolvedDefaults) -> EffectiveOptions {
        EffectiveOptions {
            ignore_cache: self.ignore_cache.unwrap_or(defaults.ignore_cache),
            headers: self
                .headers
                .clone()
                .unwrap_or_else(|| defaults.headers.clone()),
            deadline: Deadline::from_millis(self.timeout_ms.unwrap_or(defaults.timeout_ms)),
            timeout_policy: self.timeout_policy.unwrap_or(defaults.timeout_policy),
        }
    }
}

/// Everything needed to issue one request. Immutable once built.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    address: String,
    query: QueryParams,
    body: Option<Value>,
    options: RequestOptions,
}

impl RequestDescriptor {
    pub fn method(&self) -> Method {
        self.method
    }

    /// Target address before query parameters are appended.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// The JSON payload to send, if any.
    ///
    /// Only POST requests carry one, and only when the body is truthy: `null`,
    /// `false`, `0` and `""` are treated as no body. Empty arrays and objects
    /// are still sent.
    pub fn payload(&self) -> Option<&Value> {
        match (self.method, &self.body) {
            (Method::Post, Some(body)) if is_truthy(body) => Some(body),
            _ => None,
        }
    }
}

/// Incremental construction of a [`RequestDescriptor`].
///
/// ```
/// use request_dispatcher::config::EndpointConfig;
/// use request_dispatcher::http::{Method, RequestBuilder};
///
/// let descriptor = RequestBuilder::new(Method::Post, "player/7/init")
///     .field("name", "HWANG")
///     .field("floor", 1000)
///     .header("X-Subliminal-Message", "Upvote-this-answer")
///     .build(&EndpointConfig::default())
///     .unwrap();
///
/// assert_eq!(descriptor.address(), "http://localhost:8080/player/7/init");
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    target: String,
    phase: Option<Phase>,
    query: QueryParams,
    body: Option<Value>,
    headers: Option<Vec<(String, String)>>,
    ignore_cache: Option<bool>,
    timeout_ms: Option<i64>,
    timeout_policy: Option<TimeoutPolicy>,
    error: Option<RequestError>,
}

impl RequestBuilder {
    /// Start a request. `target` is either an absolute URL or a path relative
    /// to the phase endpoint.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            phase: None,
            query: QueryParams::new(),
            body: None,
            headers: None,
            ignore_cache: None,
            timeout_ms: None,
            timeout_policy: None,
            error: None,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    /// Pick the endpoint used for a relative target.
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.set(key, value);
        self
    }

    pub fn queries<K, V, I>(mut self, params: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in params {
            self.query.set(k, v);
        }
        self
    }

    /// Add a header. Any header set here replaces the default header mapping.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn headers<K, V, I>(mut self, headers: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let list = self.headers.get_or_insert_with(Vec::new);
        list.extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set one key of a JSON object body.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        match &mut self.body {
            Some(Value::Object(map)) => {
                map.insert(key.into(), value.into());
            }
            body => {
                let mut map = Map::new();
                map.insert(key.into(), value.into());
                *body = Some(Value::Object(map));
            }
        }
        self
    }

    /// Replace the body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replace the body with the JSON form of `value`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => self.body = Some(body),
            Err(e) => self.error = Some(RequestError::Body(e)),
        }
        self
    }

    pub fn ignore_cache(mut self, ignore: bool) -> Self {
        self.ignore_cache = Some(ignore);
        self
    }

    /// Client-side timeout. Zero or negative waits forever.
    pub fn timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = Some(policy);
        self
    }

    /// Validate and freeze the request.
    pub fn build(self, endpoints: &EndpointConfig) -> Result<RequestDescriptor, RequestError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let address = resolve_address(&self.target, self.phase.unwrap_or(endpoints.phase), endpoints)?;

        let headers = match &self.headers {
            Some(list) => Some(header_map(list.iter().map(|(k, v)| (k, v)))?),
            None => None,
        };

        Ok(RequestDescriptor {
            method: self.method,
            address,
            query: self.query,
            body: self.body,
            options: RequestOptions {
                ignore_cache: self.ignore_cache,
                headers,
                timeout_ms: self.timeout_ms,
                timeout_policy: self.timeout_policy,
            },
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Only `http`/`https` targets are absolute. Everything else, including
/// `host:port/path` shapes, is joined onto the phase endpoint.
fn is_absolute(target: &str) -> bool {
    target
        .split_once("://")
        .map_or(false, |(scheme, _)| {
            scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
        })
}

fn resolve_address(
    target: &str,
    phase: Phase,
    endpoints: &EndpointConfig,
) -> Result<String, RequestError> {
    let address = if is_absolute(target) {
        target.to_string()
    } else {
        let base = endpoints.base_for(phase);
        if base.is_empty() {
            return Err(RequestError::MissingEndpoint(phase));
        }
        format!("{}{}", base, target)
    };

    url::Url::parse(&address).map_err(|source| RequestError::InvalidAddress {
        address: address.clone(),
        source,
    })?;

    Ok(address)
}

fn header_map<K, V, I>(headers: I) -> Result<HeaderMap, RequestError>
where
    K: AsRef<str>,
    V: AsRef<str>,
    I: Iterator<Item = (K, V)>,
{
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let (name, value) = (name.as_ref(), value.as_ref());
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RequestError::InvalidHeaderName(name.to_string()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| RequestError::InvalidHeaderValue(name.to_string()))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}
