// Queue Domain Model

/// Queue identifier.
///
/// Queue lifecycle is owned entirely by external producers and consumers;
/// the engine only discovers names through the QueueEnumerator port and
/// never creates or deletes a queue.
pub type QueueName = String;
