// In-memory Store implementation (sorted indexes + lists)

use async_trait::async_trait;
use embargo_core::domain::Item;
use embargo_core::error::{RequeueError, Result};
use embargo_core::port::{Store, StoreOp};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// In-memory ordered-index/list store with sorted-set semantics:
/// inserting an item that already exists in an index overwrites its
/// score, while list appends always create a new entry.
///
/// Batches are applied under one mutex guard, so `exec_batch` is
/// genuinely all-or-nothing. `fail_next_batches` injects store faults
/// for atomicity tests.
#[derive(Default)]
pub struct MemoryStore {
    indexes: Mutex<HashMap<String, BTreeMap<Item, i64>>>,
    lists: Mutex<HashMap<String, Vec<Item>>>,
    fail_next_batches: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer-side insert: set `item`'s ready score in the index at
    /// `key`, overwriting any existing score for the same payload.
    pub fn index_insert(&self, key: &str, item: Item, score: i64) {
        self.indexes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .insert(item, score);
    }

    /// Snapshot of the list at `key` (consumer side, for inspection)
    pub fn list_items(&self, key: &str) -> Vec<Item> {
        self.lists
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of entries in the index at `key`
    pub fn index_len(&self, key: &str) -> usize {
        self.indexes
            .lock()
            .unwrap()
            .get(key)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Current score of `item` in the index at `key`, if present
    pub fn index_score(&self, key: &str, item: &Item) -> Option<i64> {
        self.indexes
            .lock()
            .unwrap()
            .get(key)
            .and_then(|index| index.get(item).copied())
    }

    /// Make the next `n` batches fail before applying anything
    pub fn fail_next_batches(&self, n: u32) {
        self.fail_next_batches.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn index_range_by_score(&self, key: &str, min: i64, max: i64) -> Result<Vec<Item>> {
        let indexes = self.indexes.lock().unwrap();
        let mut hits: Vec<(Item, i64)> = indexes
            .get(key)
            .map(|index| {
                index
                    .iter()
                    .filter(|(_, score)| **score >= min && **score <= max)
                    .map(|(item, score)| (item.clone(), *score))
                    .collect()
            })
            .unwrap_or_default();

        // Ascending by score; payload order breaks score ties
        hits.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(hits.into_iter().map(|(item, _)| item).collect())
    }

    async fn exec_batch(&self, ops: Vec<StoreOp>) -> Result<()> {
        if self
            .fail_next_batches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            // Rejected up front: neither sub-operation becomes visible
            return Err(RequeueError::Store("injected batch failure".to_string()));
        }

        // Both maps are locked for the whole batch; no partial state is
        // observable from another task.
        let mut indexes = self.indexes.lock().unwrap();
        let mut lists = self.lists.lock().unwrap();
        for op in ops {
            match op {
                StoreOp::ListAppend { key, item } => {
                    lists.entry(key).or_default().push(item);
                }
                StoreOp::IndexRemove { key, item } => {
                    // Removing an absent item is a no-op
                    if let Some(index) = indexes.get_mut(&key) {
                        index.remove(&item);
                    }
                }
            }
        }

        debug!("Applied store batch");
        Ok(())
    }
}
