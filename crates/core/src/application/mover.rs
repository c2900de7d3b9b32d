// Atomic Mover - delay index to pending list promotion

use crate::domain::Item;
use crate::error::Result;
use crate::port::{KeyNamespace, KeyRole, Store, StoreOp};
use std::sync::Arc;
use tracing::debug;

/// Moves one item from a queue's delay index to its pending list as a
/// single indivisible store batch.
pub struct AtomicMover {
    store: Arc<dyn Store>,
    keys: Arc<dyn KeyNamespace>,
}

impl AtomicMover {
    pub fn new(store: Arc<dyn Store>, keys: Arc<dyn KeyNamespace>) -> Self {
        Self { store, keys }
    }

    /// Append `item` to the pending list and remove it from the delay
    /// index, all-or-nothing.
    ///
    /// The append is placed before the removal: on a store without true
    /// transactions a partial batch yields a duplicate delivery rather
    /// than a lost item. Removing an absent item is a no-op, so moves
    /// completing out of order stay safe.
    pub async fn move_to_pending(&self, item: &Item, queue: &str) -> Result<()> {
        let ops = vec![
            StoreOp::ListAppend {
                key: self.keys.key(KeyRole::List, Some(queue)),
                item: item.clone(),
            },
            StoreOp::IndexRemove {
                key: self.keys.key(KeyRole::Index, Some(queue)),
                item: item.clone(),
            },
        ];
        self.store.exec_batch(ops).await?;

        debug!(queue = %queue, item = %item, "Promoted item to pending");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequeueError;
    use crate::port::PrefixKeyNamespace;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Store mock recording each batch it was asked to apply
    #[derive(Default)]
    struct RecordingStore {
        batches: Mutex<Vec<Vec<StoreOp>>>,
        fail: bool,
    }

    #[async_trait]
    impl Store for RecordingStore {
        async fn index_range_by_score(
            &self,
            _key: &str,
            _min: i64,
            _max: i64,
        ) -> Result<Vec<Item>> {
            Ok(Vec::new())
        }

        async fn exec_batch(&self, ops: Vec<StoreOp>) -> Result<()> {
            if self.fail {
                return Err(RequeueError::Store("batch rejected".to_string()));
            }
            self.batches.lock().unwrap().push(ops);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_move_issues_one_batch_append_before_remove() {
        let store = Arc::new(RecordingStore::default());
        let mover = AtomicMover::new(
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::new(PrefixKeyNamespace::new("embargo")),
        );

        mover
            .move_to_pending(&Item::new("job-1"), "emails")
            .await
            .unwrap();

        let batches = store.batches.lock().unwrap();
        assert_eq!(batches.len(), 1, "move must be a single batch");
        assert_eq!(
            batches[0],
            vec![
                StoreOp::ListAppend {
                    key: "embargo:list:emails".to_string(),
                    item: Item::new("job-1"),
                },
                StoreOp::IndexRemove {
                    key: "embargo:index:emails".to_string(),
                    item: Item::new("job-1"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let mover = AtomicMover::new(store, Arc::new(PrefixKeyNamespace::new("embargo")));

        let err = mover
            .move_to_pending(&Item::new("job-1"), "emails")
            .await
            .unwrap_err();
        assert!(matches!(err, RequeueError::Store(_)));
    }
}
