// Queue Enumerator Port

use crate::domain::QueueName;
use crate::error::Result;
use async_trait::async_trait;

/// Discovery of the active queue set; consumed once per promotion cycle
#[async_trait]
pub trait QueueEnumerator: Send + Sync {
    /// Names of all currently active queues (possibly empty)
    async fn list_queues(&self) -> Result<Vec<QueueName>>;
}
