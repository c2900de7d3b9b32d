// Error Sink Port - operational failure reporting

use crate::error::RequeueError;
use tracing::error;

/// Sink for non-fatal operational failures.
///
/// Store faults, coordination transport errors and lost leases are
/// reported here instead of terminating the host process.
pub trait ErrorSink: Send + Sync {
    fn report(&self, err: &RequeueError);
}

/// Default sink: structured error-level log line per failure
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, err: &RequeueError) {
        error!(error = %err, "Requeue engine error");
    }
}
