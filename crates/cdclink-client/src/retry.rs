//! Declarative retry policy for transactions.

use cdclink_protocol::Status;

/// Retry policy for a single operation.
///
/// The default is no retry: every error status propagates immediately.
/// An operation that knows a status to be transient declares it here
/// together with a bound on total attempts; the session re-issues the
/// request only for a listed status, never for transport or framing
/// failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    statuses: Vec<Status>,
}

impl RetryPolicy {
    /// One attempt, no retry.
    pub fn none() -> Self {
        RetryPolicy {
            max_attempts: 1,
            statuses: Vec::new(),
        }
    }

    /// Retry once (two attempts total) when the device answers with
    /// `status`.
    pub fn retry_once_on(status: Status) -> Self {
        RetryPolicy {
            max_attempts: 2,
            statuses: vec![status],
        }
    }

    /// Retry on `status` up to `max_attempts` total attempts.
    pub fn new(max_attempts: u32, statuses: Vec<Status>) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            statuses,
        }
    }

    /// Whether another attempt should follow a reply with `status`,
    /// `attempt` attempts in.
    pub(crate) fn should_retry(&self, attempt: u32, status: Status) -> bool {
        attempt < self.max_attempts && self.statuses.contains(&status)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::none()
    }
}
