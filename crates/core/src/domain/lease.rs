// Lock Lease Domain Model

/// A time-bounded exclusive lock lease.
///
/// At most one valid lease may exist system-wide for the requeue role at
/// any instant. The lease must be extended before `valid_until_ms` to
/// remain held; a crashed holder's lease simply expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    /// Lock resource name (from the key namespace)
    pub name: String,

    /// Holder token; extension and release must match it
    pub token: String,

    /// Expiry as milliseconds since epoch
    pub valid_until_ms: i64,
}

impl Lease {
    pub fn new(name: impl Into<String>, token: impl Into<String>, valid_until_ms: i64) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            valid_until_ms,
        }
    }

    /// Whether the lease is still valid at `now_ms`
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.valid_until_ms
    }
}
