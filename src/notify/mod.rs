//! Reminder delivery.
//!
//! The scheduler only needs one capability from a transport: deliver a
//! subject/body pair to an address. Two transports ship:
//! - [`LogNotifier`]: logs the message and reports success (default)
//! - [`WebhookNotifier`]: posts the message to an HTTP mail relay

mod log;
mod webhook;

pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ReminderConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Something that can deliver a reminder.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short transport name for logs.
    fn name(&self) -> &'static str;

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

pub type NotifierRef = Arc<dyn Notifier>;

/// Pick a transport from configuration.
pub fn notifier_from_config(config: &ReminderConfig) -> Result<NotifierRef, NotifyError> {
    match config.webhook_url.as_deref() {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(
            url.to_string(),
            config.from.clone(),
        )?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}
