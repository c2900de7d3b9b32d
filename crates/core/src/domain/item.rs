// Item Domain Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque queue item payload.
///
/// The engine never inspects or transforms payloads; identity for delay
/// index and pending list operations is full-value equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(String);

impl Item {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Item {
    fn from(payload: &str) -> Self {
        Self(payload.to_string())
    }
}

impl From<String> for Item {
    fn from(payload: String) -> Self {
        Self(payload)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
