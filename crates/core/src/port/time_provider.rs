// Time Provider Port (for testability)

/// Clock interface; allows a fixed clock in tests
pub trait TimeProvider: Send + Sync {
    /// Current time as milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// Wall-clock provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
