//! Due-date reminders.
//!
//! A background loop wakes once per [`TICK_INTERVAL`], reads the todos that
//! have a due time and a notification plan, and fires every (todo, offset)
//! pair whose fire time `due_at - offset` landed in the last
//! [`LOOKBACK_WINDOW`]. Each pair fires at most once per process: the
//! [`ReminderLedger`] remembers every key it has seen.
//!
//! ```text
//!   Unseen ──(fire time enters window)──▶ Eligible ──(claimed in ledger)──▶ Fired
//! ```
//!
//! Delivery is at-most-once. A failed send is logged and never retried.

mod ledger;
mod message;
mod scheduler;

pub use ledger::ReminderLedger;
pub use message::{DisplayZone, ReminderMessage};
pub use scheduler::{ReminderScheduler, TickReport};

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// How often the scheduler scans the store.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// How far back from `now` a fire time may lie and still count as due.
pub const LOOKBACK_WINDOW: Duration = Duration::from_secs(60);

/// Upper bound on one scan-and-dispatch pass.
pub const TICK_TIMEOUT: Duration = Duration::from_secs(50);

/// Instant at which the reminder `offset_minutes` before `due_at` should fire.
///
/// `None` when the result falls outside the representable date range.
pub fn fire_time(due_at: DateTime<Utc>, offset_minutes: u32) -> Option<DateTime<Utc>> {
    due_at.checked_sub_signed(TimeDelta::minutes(i64::from(offset_minutes)))
}

/// Half-open window `(now - LOOKBACK_WINDOW, now]`.
pub fn in_window(fire_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let window_start = now - TimeDelta::seconds(LOOKBACK_WINDOW.as_secs() as i64);
    window_start < fire_at && fire_at <= now
}

/// Identity of one reminder instance.
///
/// The fire time is floored to the minute, so the key does not depend on
/// which tick observed it. Changing a todo's due time yields a new key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReminderKey {
    pub todo_id: i64,
    pub offset: u32,
    /// Fire time as whole minutes since the Unix epoch
    pub fire_minute: i64,
}

impl ReminderKey {
    pub fn new(todo_id: i64, offset: u32, fire_at: DateTime<Utc>) -> Self {
        Self {
            todo_id,
            offset,
            fire_minute: fire_at.timestamp().div_euclid(60),
        }
    }
}
