// Application Layer - Requeue engine use cases

pub mod lock;
pub mod mover;
pub mod promoter;
pub mod scanner;
pub mod shutdown;

// Re-exports
pub use lock::LockCoordinator;
pub use mover::AtomicMover;
pub use promoter::{CycleOutcome, Promoter};
pub use scanner::ReadyItemScanner;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
