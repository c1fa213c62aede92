//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DispatchConfig (validated, immutable)
//!     → handed to Dispatcher::new by value
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; per-request options are merged over it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    DispatchConfig, EndpointConfig, ObservabilityConfig, Phase, RequestDefaults, TimeoutPolicy,
    TransportConfig, DEFAULT_ACCEPT,
};
pub use validation::{validate_config, ValidationError};
