//! In-memory record of fired reminders.

use chrono::{DateTime, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::ReminderKey;

/// Keys of every reminder fired by this process, with the tick that fired it.
///
/// Entries are never removed; the map lives as long as the process.
#[derive(Debug, Default)]
pub struct ReminderLedger {
    fired: Mutex<HashMap<ReminderKey, DateTime<Utc>>>,
}

impl ReminderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` if absent. Returns `false` when it was already recorded.
    pub async fn try_record(&self, key: ReminderKey, at: DateTime<Utc>) -> bool {
        match self.fired.lock().await.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(at);
                true
            }
        }
    }

    /// When `key` was recorded, if ever.
    #[cfg(test)]
    pub async fn fired_at(&self, key: &ReminderKey) -> Option<DateTime<Utc>> {
        self.fired.lock().await.get(key).copied()
    }

    pub async fn len(&self) -> usize {
        self.fired.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
