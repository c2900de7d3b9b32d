// Promoter - the single-active-scheduler promotion loop

use crate::application::lock::LockCoordinator;
use crate::application::mover::AtomicMover;
use crate::application::scanner::ReadyItemScanner;
use crate::application::shutdown::ShutdownToken;
use crate::config::RequeueConfig;
use crate::domain::Lease;
use crate::error::{RequeueError, Result};
use crate::port::{ErrorSink, KeyNamespace, LockStore, QueueEnumerator, Store, TimeProvider};
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Result of one promotion cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No queues known; no lock was taken
    Idle,
    /// The exclusive lock could not be acquired; retried next cycle
    LockUnavailable,
    /// The lease was lost mid-cycle; remaining work abandoned, no release
    LockLost { promoted: usize },
    /// Every branch drained and the lock was released once
    Completed { queues: usize, promoted: usize },
}

/// Cycle-scoped lock state owned by the orchestrator.
///
/// Per-queue branches only request extension through it; the orchestrator
/// is the sole releaser, after the join barrier over all branches. Once an
/// extension fails the lost flag stops every branch from mutating further
/// under a lease it no longer holds.
struct CycleLock<'a> {
    coordinator: &'a LockCoordinator,
    lease: Mutex<Lease>,
    lost: AtomicBool,
}

impl<'a> CycleLock<'a> {
    fn new(coordinator: &'a LockCoordinator, lease: Lease) -> Self {
        Self {
            coordinator,
            lease: Mutex::new(lease),
            lost: AtomicBool::new(false),
        }
    }

    fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    /// Extend the lease by one more duration. Returns false (and marks
    /// the cycle lost) when exclusivity can no longer be assumed.
    async fn extend(&self) -> bool {
        if self.is_lost() {
            return false;
        }
        let mut lease = self.lease.lock().await;
        match self.coordinator.extend(&lease).await {
            Ok(extended) => {
                *lease = extended;
                true
            }
            Err(_) => {
                self.lost.store(true, Ordering::SeqCst);
                false
            }
        }
    }

    async fn release(&self) {
        let lease = self.lease.lock().await;
        self.coordinator.release(&lease).await;
    }
}

/// Drives the promotion loop: enumerate queues, hold the fleet-wide lock,
/// promote every ready item, release, cool down, repeat.
pub struct Promoter {
    queues: Arc<dyn QueueEnumerator>,
    scanner: ReadyItemScanner,
    mover: AtomicMover,
    lock: LockCoordinator,
    error_sink: Arc<dyn ErrorSink>,
    wait_interval: Duration,
}

impl Promoter {
    /// Wire the promoter from its ports and configuration.
    pub fn new(
        store: Arc<dyn Store>,
        lock_store: Arc<dyn LockStore>,
        queues: Arc<dyn QueueEnumerator>,
        keys: Arc<dyn KeyNamespace>,
        time_provider: Arc<dyn TimeProvider>,
        error_sink: Arc<dyn ErrorSink>,
        config: &RequeueConfig,
    ) -> Self {
        Self {
            queues,
            scanner: ReadyItemScanner::new(
                Arc::clone(&store),
                Arc::clone(&keys),
                time_provider,
            ),
            mover: AtomicMover::new(store, Arc::clone(&keys)),
            lock: LockCoordinator::new(
                lock_store,
                keys,
                Arc::clone(&error_sink),
                config.lock.clone(),
            ),
            error_sink,
            wait_interval: config.wait_interval(),
        }
    }

    /// Run promotion cycles until shutdown is requested.
    ///
    /// Every failure mode inside a cycle is operational: reported to the
    /// error sink, never propagated out of the loop. The cooldown between
    /// cycles doubles as the idle backoff and the retry delay.
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!("Requeue promoter started");

        let error_pump = self.lock.spawn_error_pump();

        loop {
            if shutdown.is_shutdown() {
                break;
            }

            match self.run_cycle().await {
                Ok(outcome) => debug!(outcome = ?outcome, "Promotion cycle finished"),
                Err(err) => self.error_sink.report(&err),
            }

            // Cooldown before the next cycle (doubles as the idle backoff)
            tokio::select! {
                _ = sleep(self.wait_interval) => {}
                _ = shutdown.wait() => break,
            }
        }

        if let Some(pump) = error_pump {
            pump.abort();
        }
        info!("Requeue promoter stopped");
        Ok(())
    }

    /// One full pass over all known queues.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let queues = self.queues.list_queues().await?;

        // No queues means nothing to coordinate; taking the lock would
        // only starve a fleet member that does have work.
        if queues.is_empty() {
            debug!("No active queues; cycle idle");
            return Ok(CycleOutcome::Idle);
        }

        let lease = match self.lock.acquire().await {
            Ok(lease) => lease,
            Err(err) => {
                self.error_sink.report(&err);
                return Ok(CycleOutcome::LockUnavailable);
            }
        };
        let lock_name = lease.name.clone();
        let cycle_lock = CycleLock::new(&self.lock, lease);

        // Fan out one branch per queue; the join is the drain barrier.
        let branches = queues
            .iter()
            .map(|queue| self.promote_queue(queue, &cycle_lock));
        let promoted: usize = join_all(branches).await.into_iter().sum();

        if cycle_lock.is_lost() {
            warn!(promoted = promoted, "Cycle aborted: lock lost mid-cycle");
            self.error_sink.report(&RequeueError::LockLost(lock_name));
            return Ok(CycleOutcome::LockLost { promoted });
        }

        // All branches drained: the orchestrator releases exactly once.
        cycle_lock.release().await;
        info!(queues = queues.len(), promoted = promoted, "Promotion cycle completed");
        Ok(CycleOutcome::Completed {
            queues: queues.len(),
            promoted,
        })
    }

    /// Promote every ready item of one queue. Returns the promoted count.
    ///
    /// A store failure on one item skips that item only; it stays in the
    /// delay index and is retried next cycle. A lost lease stops all
    /// further mutation for this branch.
    async fn promote_queue(&self, queue: &str, lock: &CycleLock<'_>) -> usize {
        // Extend first so the lease covers this unit of work
        if !lock.extend().await {
            warn!(queue = %queue, "Skipping queue: lock no longer held");
            return 0;
        }

        let items = match self.scanner.ready_items(queue).await {
            Ok(items) => items,
            Err(err) => {
                self.error_sink.report(&err);
                return 0;
            }
        };
        if items.is_empty() {
            debug!(queue = %queue, "Queue drained: nothing ready");
            return 0;
        }

        let ready = items.len();
        let mut promoted = 0;
        for item in items {
            if lock.is_lost() {
                warn!(
                    queue = %queue,
                    promoted = promoted,
                    remaining = ready - promoted,
                    "Abandoning queue: lock lost"
                );
                break;
            }
            match self.mover.move_to_pending(&item, queue).await {
                Ok(()) => promoted += 1,
                Err(err) => self.error_sink.report(&err),
            }
        }

        debug!(queue = %queue, promoted = promoted, ready = ready, "Queue drained");
        promoted
    }
}
