//! Single-request HTTP dispatcher.
//!
//! Issues one outbound request and resolves exactly once with a
//! [`ResponseEnvelope`], racing the transport against an optional timeout.
//!
//! ```no_run
//! use request_dispatcher::{DispatchConfig, Dispatcher};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(&DispatchConfig::default())?;
//! let response = dispatcher
//!     .send(dispatcher.get("http://example.com/scores").query("page", 2).timeout_ms(100))
//!     .await?;
//!
//! if response.ok() {
//!     let scores: serde_json::Value = response.json()?;
//!     println!("{}", scores);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use config::schema::DispatchConfig;
pub use dispatch::Dispatcher;
pub use http::{Method, RequestBuilder, RequestDescriptor, ResponseEnvelope};
