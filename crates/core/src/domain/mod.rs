// Domain Layer - Pure entities, no infrastructure

pub mod item;
pub mod lease;
pub mod queue;

// Re-exports
pub use item::Item;
pub use lease::Lease;
pub use queue::QueueName;
