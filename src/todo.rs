//! Todo entity and write-payload validation.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Maximum title length (characters, after trimming).
pub const MAX_TITLE_LEN: usize = 200;

/// Calendar years a due date may fall in.
pub const DUE_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub is_done: bool,
    /// Due instant, always stored in UTC
    pub due_at: Option<DateTime<Utc>>,
    /// Planned duration in minutes
    pub minutes: Option<u32>,
    /// Reminder offsets, in minutes before `due_at`
    #[serde(default)]
    pub notify_plan_minutes: Vec<u32>,
    /// Where reminders for this todo are delivered
    #[serde(default)]
    pub notify_email: Option<String>,
}

impl Todo {
    /// Build a stored todo from a validated payload.
    pub fn from_validated(id: i64, input: ValidatedTodo) -> Self {
        Self {
            id,
            title: input.title,
            is_done: input.is_done,
            due_at: input.due_at,
            minutes: input.minutes,
            notify_plan_minutes: input.notify_plan_minutes,
            notify_email: input.notify_email,
        }
    }

    /// Whether the reminder scheduler has anything to look at for this todo.
    pub fn has_reminders(&self) -> bool {
        self.due_at.is_some() && !self.notify_plan_minutes.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title cannot exceed 200 characters")]
    TitleTooLong,

    #[error("minutes cannot be negative")]
    NegativeMinutes,

    #[error("minutes is out of range")]
    MinutesOutOfRange,

    #[error("Notification offsets cannot be negative (got {0})")]
    NegativeOffset(i64),

    #[error("Notification offset {0} is out of range")]
    OffsetOutOfRange(i64),

    #[error("dueAt must fall between years 1 and 9999 (got {0})")]
    DueAtOutOfRange(i32),
}

/// Create/update payload as sent by the browser client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default, deserialize_with = "deserialize_due_at")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub minutes: Option<i64>,
    /// `null` and missing both mean "no reminders"
    #[serde(default)]
    pub notify_plan_minutes: Option<Vec<i64>>,
    #[serde(default)]
    pub notify_email: Option<String>,
}

/// A `TodoInput` that passed validation; what the stores persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTodo {
    pub title: String,
    pub is_done: bool,
    pub due_at: Option<DateTime<Utc>>,
    pub minutes: Option<u32>,
    pub notify_plan_minutes: Vec<u32>,
    pub notify_email: Option<String>,
}

impl TodoInput {
    /// Check the payload and normalize it for storage.
    pub fn validate(self) -> Result<ValidatedTodo, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong);
        }

        if let Some(due_at) = self.due_at {
            if !DUE_YEAR_RANGE.contains(&due_at.year()) {
                return Err(ValidationError::DueAtOutOfRange(due_at.year()));
            }
        }

        let minutes = match self.minutes {
            Some(m) if m < 0 => return Err(ValidationError::NegativeMinutes),
            Some(m) => Some(u32::try_from(m).map_err(|_| ValidationError::MinutesOutOfRange)?),
            None => None,
        };

        let notify_plan_minutes = self
            .notify_plan_minutes
            .unwrap_or_default()
            .into_iter()
            .map(|offset| {
                if offset < 0 {
                    Err(ValidationError::NegativeOffset(offset))
                } else {
                    u32::try_from(offset).map_err(|_| ValidationError::OffsetOutOfRange(offset))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let notify_email = self
            .notify_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        Ok(ValidatedTodo {
            title,
            is_done: self.is_done,
            due_at: self.due_at,
            minutes,
            notify_plan_minutes,
            notify_email,
        })
    }
}

/// Accept RFC 3339 instants with any offset, or naive timestamps taken as UTC.
fn deserialize_due_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_due_at(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid dueAt: {}", value))),
    }
}

/// Parse a due timestamp, normalizing to UTC.
pub fn parse_due_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(title: &str) -> TodoInput {
        TodoInput {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_trims_title() {
        let validated = input("  buy milk ").validate().unwrap();
        assert_eq!(validated.title, "buy milk");
        assert!(validated.notify_plan_minutes.is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_and_long_titles() {
        assert_eq!(input("   ").validate(), Err(ValidationError::EmptyTitle));
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(input(&long).validate(), Err(ValidationError::TitleTooLong));
        let max = "x".repeat(MAX_TITLE_LEN);
        assert!(input(&max).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_numbers() {
        let mut payload = input("task");
        payload.minutes = Some(-5);
        assert_eq!(payload.validate(), Err(ValidationError::NegativeMinutes));

        let mut payload = input("task");
        payload.notify_plan_minutes = Some(vec![10, -1]);
        assert_eq!(payload.validate(), Err(ValidationError::NegativeOffset(-1)));
    }

    #[test]
    fn test_validate_rejects_extreme_due_dates() {
        let mut payload = input("task");
        payload.due_at = parse_due_at("-262143-01-01T00:00");
        assert!(payload.due_at.is_some());
        assert_eq!(
            payload.validate(),
            Err(ValidationError::DueAtOutOfRange(-262143))
        );

        let mut payload = input("task");
        payload.due_at = parse_due_at("9999-12-31T23:59:59Z");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_blank_email_becomes_none() {
        let mut payload = input("task");
        payload.notify_email = Some("   ".to_string());
        assert_eq!(payload.validate().unwrap().notify_email, None);
    }

    #[test]
    fn test_due_at_normalized_to_utc() {
        let json = r#"{"title":"t","isDone":false,"dueAt":"2024-01-01T06:00:00-03:00"}"#;
        let payload: TodoInput = serde_json::from_str(json).unwrap();
        assert_eq!(
            payload.due_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_due_at_naive_is_taken_as_utc() {
        assert_eq!(
            parse_due_at("2024-01-01T09:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(
            parse_due_at("2024-01-01T09:00:00.000"),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(parse_due_at("tomorrow"), None);
    }

    #[test]
    fn test_null_fields_deserialize() {
        let json = r#"{"title":"t","isDone":true,"dueAt":null,"minutes":null,"notifyPlanMinutes":null}"#;
        let payload: TodoInput = serde_json::from_str(json).unwrap();
        let validated = payload.validate().unwrap();
        assert!(validated.is_done);
        assert_eq!(validated.due_at, None);
        assert!(validated.notify_plan_minutes.is_empty());
    }

    #[test]
    fn test_todo_serializes_camel_case() {
        let todo = Todo {
            id: 1,
            title: "Standup".to_string(),
            is_done: false,
            due_at: None,
            minutes: Some(15),
            notify_plan_minutes: vec![10],
            notify_email: None,
        };
        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(value["isDone"], false);
        assert_eq!(value["notifyPlanMinutes"][0], 10);
        assert!(value["dueAt"].is_null());
    }
}
