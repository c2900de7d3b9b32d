// Lock Coordinator - fleet-wide exclusivity for the promotion loop

use crate::config::LockSettings;
use crate::domain::Lease;
use crate::error::{RequeueError, Result};
use crate::port::{ErrorSink, KeyNamespace, KeyRole, LockStore};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Acquires, extends and releases the single requeue lock.
///
/// The lock store port is single-shot; retry with jittered backoff lives
/// here. A short lease extended once per unit of work bounds the damage
/// of a crashed holder (the lease self-expires) while allowing unbounded
/// total processing time.
pub struct LockCoordinator {
    lock_store: Arc<dyn LockStore>,
    keys: Arc<dyn KeyNamespace>,
    error_sink: Arc<dyn ErrorSink>,
    settings: LockSettings,
}

impl LockCoordinator {
    pub fn new(
        lock_store: Arc<dyn LockStore>,
        keys: Arc<dyn KeyNamespace>,
        error_sink: Arc<dyn ErrorSink>,
        settings: LockSettings,
    ) -> Self {
        Self {
            lock_store,
            keys,
            error_sink,
            settings,
        }
    }

    /// Drain the lock store's asynchronous transport-error channel into
    /// the error sink. Returns `None` when the store has no such channel
    /// or it was already taken.
    pub fn spawn_error_pump(&self) -> Option<tokio::task::JoinHandle<()>> {
        let mut rx = self.lock_store.error_stream()?;
        let sink = Arc::clone(&self.error_sink);
        Some(tokio::spawn(async move {
            while let Some(err) = rx.recv().await {
                sink.report(&err);
            }
        }))
    }

    /// Acquire the requeue lock, retrying with jittered delays until
    /// `retry_count` retries are exhausted.
    pub async fn acquire(&self) -> Result<Lease> {
        let name = self.keys.key(KeyRole::RequeueLock, None);

        for attempt in 0..=self.settings.retry_count {
            match self.lock_store.try_acquire(&name, self.settings.lease_ms).await {
                Ok(Some(lease)) => {
                    debug!(lock = %name, attempt = attempt, "Lock acquired");
                    return Ok(self.trim_drift(lease));
                }
                Ok(None) => {
                    debug!(lock = %name, attempt = attempt, "Lock held elsewhere");
                }
                Err(err) => {
                    // Transport fault counts as a failed attempt
                    self.error_sink.report(&err);
                }
            }

            if attempt < self.settings.retry_count {
                sleep(self.retry_delay()).await;
            }
        }

        Err(RequeueError::LockUnavailable(name))
    }

    /// Extend a held lease by one more lease duration.
    ///
    /// Any failure here means exclusivity can no longer be assumed, so a
    /// transport fault is reported and then surfaced as a lost lock.
    pub async fn extend(&self, lease: &Lease) -> Result<Lease> {
        match self.lock_store.extend(lease, self.settings.lease_ms).await {
            Ok(Some(extended)) => Ok(self.trim_drift(extended)),
            Ok(None) => Err(RequeueError::LockLost(lease.name.clone())),
            Err(err) => {
                self.error_sink.report(&err);
                Err(RequeueError::LockLost(lease.name.clone()))
            }
        }
    }

    /// Release a held lease. Best-effort: failures are logged and
    /// reported, never propagated, since the lease expires naturally.
    pub async fn release(&self, lease: &Lease) {
        if let Err(err) = self.lock_store.release(lease).await {
            warn!(lock = %lease.name, error = %err, "Lock release failed; lease will expire");
            self.error_sink.report(&err);
        }
    }

    /// Redlock validity trim: subtract the clock-drift allowance so the
    /// lease is treated as expired slightly before the store would.
    fn trim_drift(&self, mut lease: Lease) -> Lease {
        lease.valid_until_ms -= self.drift_allowance_ms();
        lease
    }

    fn drift_allowance_ms(&self) -> i64 {
        (self.settings.lease_ms as f64 * self.settings.drift_factor).round() as i64 + 2
    }

    fn retry_delay(&self) -> Duration {
        let jitter = if self.settings.retry_jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.settings.retry_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.settings.retry_delay_ms + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Lock store that refuses the first `deny` acquisition attempts
    struct FlakyLockStore {
        deny: u32,
        attempts: AtomicU32,
        extend_lost: bool,
        release_fails: bool,
    }

    impl FlakyLockStore {
        fn new(deny: u32) -> Self {
            Self {
                deny,
                attempts: AtomicU32::new(0),
                extend_lost: false,
                release_fails: false,
            }
        }
    }

    #[async_trait]
    impl LockStore for FlakyLockStore {
        async fn try_acquire(&self, name: &str, ttl_ms: i64) -> Result<Option<Lease>> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if n < self.deny {
                return Ok(None);
            }
            Ok(Some(Lease::new(name, "token-1", 10_000 + ttl_ms)))
        }

        async fn extend(&self, lease: &Lease, ttl_ms: i64) -> Result<Option<Lease>> {
            if self.extend_lost {
                return Ok(None);
            }
            Ok(Some(Lease::new(
                lease.name.clone(),
                lease.token.clone(),
                lease.valid_until_ms + ttl_ms,
            )))
        }

        async fn release(&self, _lease: &Lease) -> Result<()> {
            if self.release_fails {
                return Err(RequeueError::Coordination("connection reset".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        reports: Mutex<Vec<String>>,
    }

    impl ErrorSink for CollectingSink {
        fn report(&self, err: &RequeueError) {
            self.reports.lock().unwrap().push(err.to_string());
        }
    }

    fn coordinator(store: Arc<FlakyLockStore>, sink: Arc<CollectingSink>) -> LockCoordinator {
        LockCoordinator::new(
            store,
            Arc::new(crate::port::PrefixKeyNamespace::new("embargo")),
            sink,
            LockSettings::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_succeeds_after_retries() {
        let store = Arc::new(FlakyLockStore::new(3));
        let coord = coordinator(Arc::clone(&store), Arc::new(CollectingSink::default()));

        let lease = coord.acquire().await.unwrap();
        assert_eq!(lease.name, "embargo:requeue_lock");
        assert_eq!(store.attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_exhausts_retries() {
        let store = Arc::new(FlakyLockStore::new(u32::MAX));
        let coord = coordinator(Arc::clone(&store), Arc::new(CollectingSink::default()));

        let err = coord.acquire().await.unwrap_err();
        assert!(matches!(err, RequeueError::LockUnavailable(_)));
        // retry_count retries on top of the initial attempt
        assert_eq!(store.attempts.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_acquire_trims_drift_allowance() {
        let store = Arc::new(FlakyLockStore::new(0));
        let coord = coordinator(store, Arc::new(CollectingSink::default()));

        let lease = coord.acquire().await.unwrap();
        // store grants 10_000 + 1_000; drift allowance is 1000 * 0.01 + 2
        assert_eq!(lease.valid_until_ms, 11_000 - 12);
    }

    #[tokio::test]
    async fn test_extend_reports_lost_lease() {
        let mut store = FlakyLockStore::new(0);
        store.extend_lost = true;
        let coord = coordinator(Arc::new(store), Arc::new(CollectingSink::default()));

        let lease = Lease::new("embargo:requeue_lock", "token-1", 5_000);
        let err = coord.extend(&lease).await.unwrap_err();
        assert!(matches!(err, RequeueError::LockLost(_)));
    }

    #[tokio::test]
    async fn test_release_failure_is_swallowed_and_reported() {
        let mut store = FlakyLockStore::new(0);
        store.release_fails = true;
        let sink = Arc::new(CollectingSink::default());
        let coord = coordinator(Arc::new(store), Arc::clone(&sink));

        let lease = Lease::new("embargo:requeue_lock", "token-1", 5_000);
        coord.release(&lease).await;

        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains("connection reset"));
    }
}
