// Ready Item Scanner - delay-index reads

use crate::domain::Item;
use crate::error::Result;
use crate::port::{KeyNamespace, KeyRole, Store, TimeProvider};
use std::sync::Arc;
use tracing::debug;

/// Reads the items whose embargo has elapsed.
pub struct ReadyItemScanner {
    store: Arc<dyn Store>,
    keys: Arc<dyn KeyNamespace>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ReadyItemScanner {
    pub fn new(
        store: Arc<dyn Store>,
        keys: Arc<dyn KeyNamespace>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            store,
            keys,
            time_provider,
        }
    }

    /// All items in `queue`'s delay index with ready score in `[0, now]`.
    ///
    /// `now` is sampled once per call; an item that becomes ready while
    /// the scan is in flight is picked up on the next cycle. Store
    /// failures propagate to the orchestrator, no internal retry.
    pub async fn ready_items(&self, queue: &str) -> Result<Vec<Item>> {
        let now = self.time_provider.now_millis();
        let key = self.keys.key(KeyRole::Index, Some(queue));
        let items = self.store.index_range_by_score(&key, 0, now).await?;

        debug!(queue = %queue, ready = items.len(), "Scanned delay index");
        Ok(items)
    }
}
