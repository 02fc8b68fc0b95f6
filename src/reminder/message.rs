//! Reminder subject/body text.
//!
//! Existing clients match on this text, so the wording is fixed:
//! - subject: `Reminder: "<title>" in <offset> minute(s)`
//! - body: `Event "<title>" starts at <time> on <date>. That's in <offset> minute(s).`

use chrono::{DateTime, FixedOffset, Local, Utc};

/// 12-hour clock, e.g. `9:05 PM`.
const TIME_FORMAT: &str = "%-I:%M %p";
/// Short month/day/year date, e.g. `1/31/2024`.
const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Zone used to present due times to the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The server's local zone
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn from_offset(offset: Option<FixedOffset>) -> Self {
        offset.map(Self::Fixed).unwrap_or_default()
    }

    /// `(time, date)` strings for `at` in this zone.
    fn present(&self, at: DateTime<Utc>) -> (String, String) {
        match self {
            Self::Local => {
                let local = at.with_timezone(&Local);
                (
                    local.format(TIME_FORMAT).to_string(),
                    local.format(DATE_FORMAT).to_string(),
                )
            }
            Self::Fixed(offset) => {
                let local = at.with_timezone(offset);
                (
                    local.format(TIME_FORMAT).to_string(),
                    local.format(DATE_FORMAT).to_string(),
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMessage {
    pub subject: String,
    pub body: String,
}

impl ReminderMessage {
    pub fn compose(title: &str, offset: u32, due_at: DateTime<Utc>, zone: &DisplayZone) -> Self {
        let (time, date) = zone.present(due_at);
        Self {
            subject: format!("Reminder: \"{}\" in {} minute(s)", title, offset),
            body: format!(
                "Event \"{}\" starts at {} on {}. That's in {} minute(s).",
                title, time, date, offset
            ),
        }
    }
}
