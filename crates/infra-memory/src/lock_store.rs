// In-memory LockStore implementation

use async_trait::async_trait;
use embargo_core::domain::Lease;
use embargo_core::error::{RequeueError, Result};
use embargo_core::port::{LockStore, TimeProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;

struct Holder {
    token: String,
    valid_until_ms: i64,
}

/// In-memory lock store with lease expiry semantics.
///
/// A name maps to at most one holder; an expired holder is evicted on
/// the next contact with that name. Transport faults can be injected
/// onto the asynchronous error channel to exercise the coordinator's
/// error pump.
pub struct MemoryLockStore {
    holders: Mutex<HashMap<String, Holder>>,
    time_provider: Arc<dyn TimeProvider>,
    error_tx: mpsc::UnboundedSender<RequeueError>,
    error_rx: Mutex<Option<mpsc::UnboundedReceiver<RequeueError>>>,
}

impl MemoryLockStore {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        Self {
            holders: Mutex::new(HashMap::new()),
            time_provider,
            error_tx,
            error_rx: Mutex::new(Some(error_rx)),
        }
    }

    /// Push a transport fault onto the error channel (test harness)
    pub fn inject_transport_error(&self, message: impl Into<String>) {
        let _ = self
            .error_tx
            .send(RequeueError::Coordination(message.into()));
    }

    /// Force the named lease to expire immediately (test harness for
    /// lost-lock scenarios)
    pub fn expire_now(&self, name: &str) {
        if let Some(holder) = self.holders.lock().unwrap().get_mut(name) {
            holder.valid_until_ms = i64::MIN;
        }
    }

    /// Whether the named lock currently has an unexpired holder
    pub fn is_held(&self, name: &str) -> bool {
        let now = self.time_provider.now_millis();
        self.holders
            .lock()
            .unwrap()
            .get(name)
            .map(|holder| now < holder.valid_until_ms)
            .unwrap_or(false)
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn try_acquire(&self, name: &str, ttl_ms: i64) -> Result<Option<Lease>> {
        let now = self.time_provider.now_millis();
        let mut holders = self.holders.lock().unwrap();

        if let Some(holder) = holders.get(name) {
            if now < holder.valid_until_ms {
                return Ok(None);
            }
            // Previous holder's lease lapsed
        }

        let token = uuid::Uuid::new_v4().to_string();
        let valid_until_ms = now + ttl_ms;
        holders.insert(
            name.to_string(),
            Holder {
                token: token.clone(),
                valid_until_ms,
            },
        );

        debug!(lock = %name, "Lease granted");
        Ok(Some(Lease::new(name, token, valid_until_ms)))
    }

    async fn extend(&self, lease: &Lease, ttl_ms: i64) -> Result<Option<Lease>> {
        let now = self.time_provider.now_millis();
        let mut holders = self.holders.lock().unwrap();

        match holders.get_mut(&lease.name) {
            Some(holder) if holder.token == lease.token && now < holder.valid_until_ms => {
                holder.valid_until_ms = now + ttl_ms;
                Ok(Some(Lease::new(
                    lease.name.clone(),
                    lease.token.clone(),
                    holder.valid_until_ms,
                )))
            }
            // Expired or stolen; the caller no longer holds the lock
            _ => Ok(None),
        }
    }

    async fn release(&self, lease: &Lease) -> Result<()> {
        let mut holders = self.holders.lock().unwrap();
        // Only the matching holder may evict the entry
        if let Some(holder) = holders.get(&lease.name) {
            if holder.token == lease.token {
                holders.remove(&lease.name);
                debug!(lock = %lease.name, "Lease released");
            }
        }
        Ok(())
    }

    fn error_stream(&self) -> Option<mpsc::UnboundedReceiver<RequeueError>> {
        self.error_rx.lock().unwrap().take()
    }
}
