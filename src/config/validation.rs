//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check endpoint URLs are absolute http(s) addresses
//! - Check default headers are valid HTTP header names and values
//! - Check the configured log level is known
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use reqwest::header::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::DispatchConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("endpoints.{phase}: '{value}' is not an absolute http(s) URL")]
    InvalidEndpoint { phase: &'static str, value: String },

    #[error("defaults.headers: invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("defaults.headers.{0}: invalid header value")]
    InvalidHeaderValue(String),

    #[error("observability.log_level: unknown level '{0}'")]
    UnknownLogLevel(String),
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (phase, value) in [("dev", &config.endpoints.dev), ("real", &config.endpoints.real)] {
        if !is_http_url(value) {
            errors.push(ValidationError::InvalidEndpoint {
                phase,
                value: value.clone(),
            });
        }
    }

    for (name, value) in &config.defaults.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        } else if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeaderValue(name.clone()));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
