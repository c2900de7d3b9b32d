// Store Port - ordered-index and list primitives of the backing store

use crate::domain::Item;
use crate::error::Result;
use async_trait::async_trait;

/// One operation inside an atomic batch.
///
/// Ordering inside a batch is significant when a store cannot honor true
/// all-or-nothing execution: callers place the appends first so a partial
/// failure degrades to at-least-once delivery rather than item loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Append an item to the tail of the list at `key`
    ListAppend { key: String, item: Item },

    /// Remove an item from the ordered index at `key` (no-op if absent)
    IndexRemove { key: String, item: Item },
}

/// Backing-store interface for the delay index and pending lists
#[async_trait]
pub trait Store: Send + Sync {
    /// All items in the ordered index at `key` with score in `[min, max]`,
    /// returned ascending by score
    async fn index_range_by_score(&self, key: &str, min: i64, max: i64) -> Result<Vec<Item>>;

    /// Apply `ops` as a single indivisible batch.
    ///
    /// If the batch fails at the store level, neither sub-operation may be
    /// visible.
    async fn exec_batch(&self, ops: Vec<StoreOp>) -> Result<()>;
}
