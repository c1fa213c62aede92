//! Timeout enforcement.
//!
//! # Responsibilities
//! - Turn a millisecond setting into an optional deadline (`<= 0` means none)
//! - Race a request future against its deadline; the first to settle wins
//! - Apply the timeout policy to the losing transport
//!
//! # Design Decisions
//! - Uses Tokio's timer; the timer is dropped as soon as the request settles
//! - `Detach` runs the request on its own task and leaves it running after a timeout
//! - `Abort` drops the request future, which releases the connection

use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::config::TimeoutPolicy;

/// An optional limit on how long a caller waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline(Option<Duration>);

impl Deadline {
    /// Zero or negative means wait forever.
    pub fn from_millis(ms: i64) -> Self {
        if ms > 0 {
            Self(Some(Duration::from_millis(ms as u64)))
        } else {
            Self(None)
        }
    }

    pub fn never() -> Self {
        Self(None)
    }

    pub fn limit(&self) -> Option<Duration> {
        self.0
    }
}

/// How a raced future settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<T> {
    Completed(T),
    TimedOut,
}

/// Wait for `fut` or the deadline, whichever comes first.
///
/// Exactly one result is returned. Without a deadline no timer is armed.
pub async fn settle_within<F>(fut: F, deadline: Deadline, policy: TimeoutPolicy) -> Settled<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let Some(limit) = deadline.limit() else {
        return Settled::Completed(fut.await);
    };

    match policy {
        TimeoutPolicy::Abort => match time::timeout(limit, fut).await {
            Ok(output) => Settled::Completed(output),
            Err(_) => Settled::TimedOut,
        },
        TimeoutPolicy::Detach => {
            let mut handle = tokio::spawn(fut);
            tokio::select! {
                joined = &mut handle => match joined {
                    Ok(output) => Settled::Completed(output),
                    Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                    // Only reachable if the runtime is shutting down
                    Err(_) => Settled::TimedOut,
                },
                _ = time::sleep(limit) => {
                    // Dropping the JoinHandle detaches the task
                    tracing::debug!(limit_ms = limit.as_millis() as u64, "Deadline passed, detaching request task");
                    Settled::TimedOut
                }
            }
        }
    }
}
