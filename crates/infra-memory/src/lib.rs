// Embargo Infra Memory - in-process adapters for the core ports
//
// Stands in for an external sorted-set/list store and lock store at the
// same port boundary. Used by hosts that embed the engine in a single
// process and by the integration test suite.

pub mod lock_store;
pub mod queue_registry;
pub mod store;

pub use lock_store::MemoryLockStore;
pub use queue_registry::StaticQueueEnumerator;
pub use store::MemoryStore;
