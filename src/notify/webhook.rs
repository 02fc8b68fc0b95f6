//! HTTP mail-relay transport.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{Notifier, NotifyError};

/// Upper bound on a single relay call, kept well under the scheduler tick.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Posts reminders as JSON to a relay endpoint that owns the actual mail transport.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    from: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: String, from: Option<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, url, from })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = RelayMessage {
            from: self.from.as_deref(),
            to,
            subject,
            body,
        };

        let response = match self.client.post(&self.url).json(&message).send().await {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(NotifyError::Transport(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(NotifyError::Transport(format!("Connection failed: {}", e)));
                } else {
                    return Err(NotifyError::Transport(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to, status = status.as_u16(), "Relay accepted reminder");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_message_omits_missing_sender() {
        let message = RelayMessage {
            from: None,
            to: "a@b.com",
            subject: "s",
            body: "b",
        };
        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("from").is_none());
        assert_eq!(value["to"], "a@b.com");
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_transport_error() {
        // Reserve a free port, then release it so nothing is listening.
        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/send", port);
        let notifier = WebhookNotifier::new(url, None).unwrap();
        let err = notifier.send("a@b.com", "s", "b").await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
    }
}
