//! Configuration management for clean-todos.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `5080`.
//! - `TODO_STORE` - Optional. `memory` or `sqlite`. Defaults to `sqlite`.
//! - `DATA_DIR` - Optional. Directory for the SQLite database. Defaults to `./data`.
//! - `CORS_ORIGIN` - Optional. Single origin allowed to call the API (e.g. the Vite dev server).
//!   When unset, CORS is permissive.
//! - `REMINDERS_ENABLED` - Optional. `true`/`false`. Defaults to `true`.
//! - `REMINDER_WEBHOOK_URL` - Optional. Mail relay endpoint; reminders are only logged when unset.
//! - `REMINDER_FROM` - Optional. Sender address forwarded to the relay.
//! - `REMINDER_UTC_OFFSET` - Optional. `±HH:MM` offset used to present due times in reminder
//!   text. Defaults to the server's local zone.

use std::path::PathBuf;

use chrono::FixedOffset;
use thiserror::Error;

use crate::store::TodoStoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Reminder delivery configuration.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Whether the background reminder scheduler runs at all
    pub enabled: bool,

    /// Mail relay endpoint (None = log-only delivery)
    pub webhook_url: Option<String>,

    /// Sender address passed to the relay
    pub from: Option<String>,

    /// Fixed presentation offset for message text (None = server local zone)
    pub utc_offset: Option<FixedOffset>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webhook_url: None,
            from: None,
            utc_offset: None,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Storage backend for todos
    pub store: TodoStoreType,

    /// Directory holding persistent data
    pub data_dir: PathBuf,

    /// Allowed browser origin (None = permissive)
    pub cors_origin: Option<String>,

    /// Reminder scheduler configuration
    pub reminders: ReminderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5080,
            store: TodoStoreType::default(),
            data_dir: PathBuf::from("data"),
            cors_origin: None,
            reminders: ReminderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5080".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let store = std::env::var("TODO_STORE")
            .map(|s| TodoStoreType::from_str(&s))
            .unwrap_or_default();

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let cors_origin = non_empty_env("CORS_ORIGIN");

        let enabled = match non_empty_env("REMINDERS_ENABLED") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidValue("REMINDERS_ENABLED".to_string(), value.clone())
            })?,
            None => true,
        };

        let utc_offset = non_empty_env("REMINDER_UTC_OFFSET")
            .map(|value| parse_utc_offset(&value))
            .transpose()?;

        let reminders = ReminderConfig {
            enabled,
            webhook_url: non_empty_env("REMINDER_WEBHOOK_URL"),
            from: non_empty_env("REMINDER_FROM"),
            utc_offset,
        };

        Ok(Self {
            host,
            port,
            store,
            data_dir,
            cors_origin,
            reminders,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a `±HH:MM` (or `Z`) offset into a chrono `FixedOffset`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::InvalidValue("REMINDER_UTC_OFFSET".to_string(), value.to_string());

    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match value.chars().next() {
        Some('+') => (1, &value[1..]),
        Some('-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
