//! API request and response types.

use serde::Serialize;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Storage backend in use ("memory" or "sqlite")
    pub store: String,

    /// Whether todos survive a restart
    pub persistent: bool,

    /// Whether the reminder scheduler is running
    pub reminders: bool,
}
