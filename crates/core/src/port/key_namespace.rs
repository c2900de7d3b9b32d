// Key Namespace Port - logical role to concrete storage key

/// Logical roles of the storage keys the engine touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// Fleet-wide requeue scheduler lock
    RequeueLock,
    /// Per-queue delay index (item -> ready score)
    Index,
    /// Per-queue pending list
    List,
}

impl KeyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyRole::RequeueLock => "requeue_lock",
            KeyRole::Index => "index",
            KeyRole::List => "list",
        }
    }
}

/// Maps a logical role (plus an optional queue name) to a storage key.
/// Pure, no side effects.
pub trait KeyNamespace: Send + Sync {
    fn key(&self, role: KeyRole, queue: Option<&str>) -> String;
}

/// Default namespace: `<prefix>:<role>` or `<prefix>:<role>:<queue>`
pub struct PrefixKeyNamespace {
    prefix: String,
}

impl PrefixKeyNamespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl KeyNamespace for PrefixKeyNamespace {
    fn key(&self, role: KeyRole, queue: Option<&str>) -> String {
        match queue {
            Some(queue) => format!("{}:{}:{}", self.prefix, role.as_str(), queue),
            None => format!("{}:{}", self.prefix, role.as_str()),
        }
    }
}
