// Port Layer - Interfaces for external dependencies

pub mod error_sink;
pub mod key_namespace;
pub mod lock_store;
pub mod queue_enumerator;
pub mod store;
pub mod time_provider;

// Re-exports
pub use error_sink::{ErrorSink, TracingErrorSink};
pub use key_namespace::{KeyNamespace, KeyRole, PrefixKeyNamespace};
pub use lock_store::LockStore;
pub use queue_enumerator::QueueEnumerator;
pub use store::{Store, StoreOp};
pub use time_provider::{SystemTimeProvider, TimeProvider};
