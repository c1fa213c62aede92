//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dispatcher.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Accept header sent when the caller supplies no header mapping.
pub const DEFAULT_ACCEPT: &str = "application/json, text/javascript, text/plain";

/// Root configuration for the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Per-request defaults merged under caller options.
    pub defaults: RequestDefaults,

    /// Base hosts used for relative request targets.
    pub endpoints: EndpointConfig,

    /// HTTP client settings.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// What happens to the in-flight transport when the timer wins the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Resolve the caller and let the transport run to completion unobserved.
    #[default]
    Detach,
    /// Resolve the caller and drop the transport, releasing its connection.
    Abort,
}

/// Request defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestDefaults {
    /// Send `Cache-Control: no-cache`.
    pub ignore_cache: bool,

    /// Headers applied when a request supplies none.
    pub headers: BTreeMap<String, String>,

    /// Client-side timeout in milliseconds. Zero or negative waits forever.
    pub timeout_ms: i64,

    /// Behavior of the transport after a timeout.
    pub timeout_policy: TimeoutPolicy,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), DEFAULT_ACCEPT.to_string());

        Self {
            ignore_cache: false,
            headers,
            timeout_ms: 5000,
            timeout_policy: TimeoutPolicy::Detach,
        }
    }
}

/// Deployment phase selecting a base host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Dev,
    Real,
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Phase::Dev),
            "real" => Ok(Phase::Real),
            other => Err(format!("unknown phase '{}' (expected dev or real)", other)),
        }
    }
}

/// Base hosts keyed by phase.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Phase used when a request does not pick one.
    pub phase: Phase,

    /// Base host for the dev phase (e.g., "http://localhost:8080/").
    pub dev: String,

    /// Base host for the real phase.
    pub real: String,
}

impl EndpointConfig {
    /// Base host for the given phase.
    pub fn base_for(&self, phase: Phase) -> &str {
        match phase {
            Phase::Dev => &self.dev,
            Phase::Real => &self.real,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            phase: Phase::Dev,
            dev: "http://localhost:8080/".to_string(),
            real: "http://localhost:8080/".to_string(),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// User-Agent header set on every request.
    pub user_agent: String,

    /// Ignore system proxy settings.
    pub no_proxy: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("request-dispatcher/", env!("CARGO_PKG_VERSION")).to_string(),
            no_proxy: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of the pretty format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
