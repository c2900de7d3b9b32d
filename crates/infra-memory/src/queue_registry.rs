// Static queue enumerator

use async_trait::async_trait;
use embargo_core::domain::QueueName;
use embargo_core::error::Result;
use embargo_core::port::QueueEnumerator;
use std::sync::Mutex;

/// Enumerator over a host-managed queue set.
///
/// The set can be replaced at runtime; the engine observes the change on
/// its next cycle.
#[derive(Default)]
pub struct StaticQueueEnumerator {
    queues: Mutex<Vec<QueueName>>,
}

impl StaticQueueEnumerator {
    pub fn new(queues: Vec<QueueName>) -> Self {
        Self {
            queues: Mutex::new(queues),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the active queue set
    pub fn set_queues(&self, queues: Vec<QueueName>) {
        *self.queues.lock().unwrap() = queues;
    }
}

#[async_trait]
impl QueueEnumerator for StaticQueueEnumerator {
    async fn list_queues(&self) -> Result<Vec<QueueName>> {
        Ok(self.queues.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_queues_is_visible_to_next_listing() {
        let enumerator = StaticQueueEnumerator::empty();
        assert!(enumerator.list_queues().await.unwrap().is_empty());

        enumerator.set_queues(vec!["emails".to_string()]);
        assert_eq!(
            enumerator.list_queues().await.unwrap(),
            vec!["emails".to_string()]
        );
    }
}
