//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to server:
//!     → timeouts.rs (race transport against the client-side deadline)
//!     → first settled source wins, the other is dropped or detached
//! ```
//!
//! # Design Decisions
//! - One best-effort timeout per request; no retries, no circuit breaking
//! - A timeout is terminal; callers retry if they want to

pub mod timeouts;

pub use timeouts::{settle_within, Deadline, Settled};
