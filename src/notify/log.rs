use async_trait::async_trait;

use super::{Notifier, NotifyError};

/// Transport used when no relay is configured: the reminder only shows up in logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to, subject, body, "Reminder (log transport, not delivered)");
        Ok(())
    }
}
