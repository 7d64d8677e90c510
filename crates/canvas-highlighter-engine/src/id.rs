use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one highlight, opaque to callers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeId(String);

impl RangeId {
    /// Number of hex characters in a generated id.
    pub const LEN: usize = 8;

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random id of [`RangeId::LEN`] lowercase hex characters.
    ///
    /// The characters come from the random head of a v4 UUID, before the
    /// version nibble.
    pub fn generate() -> Self {
        let mut hex = Uuid::new_v4().simple().to_string();
        hex.truncate(Self::LEN);
        Self(hex)
    }

    /// Generates ids until one is not reported as taken.
    pub fn generate_unique(mut is_taken: impl FnMut(&RangeId) -> bool) -> Self {
        loop {
            let id = Self::generate();
            if !is_taken(&id) {
                return id;
            }
            log::debug!("range id {id} already in use, regenerating");
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RangeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RangeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
