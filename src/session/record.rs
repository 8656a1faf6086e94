//! Session data as held by a store.

use std::collections::HashMap;

use super::{SessionId, SessionValue};

/// Flash category used when none is given.
pub const DEFAULT_FLASH_CATEGORY: &str = "_flash";

/// The data of one session: key-value pairs plus flash queues.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Identifier the store uses to find this record again.
    pub id: SessionId,
    /// Stored values.
    pub values: HashMap<String, SessionValue>,
    /// Flash messages by category.
    pub flashes: HashMap<String, Vec<SessionValue>>,
    /// Whether the store created this record for the current request.
    pub is_new: bool,
}

impl SessionRecord {
    /// Create an empty record with a fresh ID.
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create an empty record with the given ID.
    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            values: HashMap::new(),
            flashes: HashMap::new(),
            is_new: true,
        }
    }

    /// Remove and return all flashes in a category.
    pub fn take_flashes(&mut self, category: Option<&str>) -> Vec<SessionValue> {
        self.flashes
            .remove(category.unwrap_or(DEFAULT_FLASH_CATEGORY))
            .unwrap_or_default()
    }

    /// Append a flash to a category.
    pub fn push_flash(&mut self, value: SessionValue, category: Option<&str>) {
        self.flashes
            .entry(category.unwrap_or(DEFAULT_FLASH_CATEGORY).to_string())
            .or_default()
            .push(value);
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}
