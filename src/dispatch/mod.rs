//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor
//!     → dispatcher.rs (effective URL, merged headers, JSON body)
//!     → transport (send) ─┐
//!     → deadline timer ───┴─▶ first settled wins
//!     → ResponseEnvelope (resolved exactly once)
//! ```
//!
//! # Design Decisions
//! - Dispatch never returns an error; failures are envelopes with `ok == false`
//! - No retries; a failed or timed-out call is terminal
//! - Each call owns its own transport future and timer; nothing is shared across calls

pub mod dispatcher;

pub use dispatcher::{Dispatcher, SetupError};
