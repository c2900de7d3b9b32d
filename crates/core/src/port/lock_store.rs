// Lock Store Port - distributed mutual-exclusion primitive

use crate::domain::Lease;
use crate::error::{RequeueError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Client interface to the distributed lock store.
///
/// Single-shot operations only; retry, jitter and backoff live in the
/// LockCoordinator. `Ok(None)` means "held by someone else" (acquire) or
/// "no longer ours" (extend) - distinct from a transport failure, which
/// is an `Err`.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// One acquisition attempt for the named lock
    async fn try_acquire(&self, name: &str, ttl_ms: i64) -> Result<Option<Lease>>;

    /// Extend a held lease by `ttl_ms` from now. Returns `Ok(None)` if
    /// the lease has expired or was stolen.
    async fn extend(&self, lease: &Lease, ttl_ms: i64) -> Result<Option<Lease>>;

    /// Release a held lease. Releasing an expired or stolen lease is not
    /// an error; the lease would have lapsed anyway.
    async fn release(&self, lease: &Lease) -> Result<()>;

    /// One-shot stream of asynchronous transport errors (connection
    /// drops and the like). The coordinator drains it into the error
    /// sink; implementations without such a channel return `None`.
    fn error_stream(&self) -> Option<mpsc::UnboundedReceiver<RequeueError>> {
        None
    }
}
