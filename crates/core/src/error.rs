// Central Error Type for the Engine

use thiserror::Error;

/// Engine-level error type
#[derive(Error, Debug)]
pub enum RequeueError {
    /// Exclusive lock could not be acquired after exhausting retries.
    /// The cycle aborts and is retried on the next scheduled pass.
    #[error("Lock unavailable: retries exhausted for '{0}'")]
    LockUnavailable(String),

    /// Lease extension failed mid-cycle: the lease expired or was stolen.
    /// Remaining work in the cycle must be abandoned without further
    /// mutations under the assumption of exclusivity.
    #[error("Lock lost: lease no longer held for '{0}'")]
    LockLost(String),

    /// A scan or move against the backing store failed. The affected item
    /// stays in the delay index and is retried next cycle.
    #[error("Store error: {0}")]
    Store(String),

    /// Transport-level failure against the lock store. Reported
    /// asynchronously via the error sink, never fatal.
    #[error("Coordination error: {0}")]
    Coordination(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using RequeueError
pub type Result<T> = std::result::Result<T, RequeueError>;

// From implementation for infra crates (to avoid circular dependency)
impl From<String> for RequeueError {
    fn from(err: String) -> Self {
        RequeueError::Store(err)
    }
}
