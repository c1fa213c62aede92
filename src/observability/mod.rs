//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher produces:
//!     → spans carrying request ID, method and URL
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows through every event of a dispatch
//! - Metrics are cheap and no-op until a recorder is installed

pub mod logging;
pub mod metrics;
