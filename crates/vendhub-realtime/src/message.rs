//! Outbound message envelope pushed to real-time connections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Messages sent from the server to a connected client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A named event with a JSON payload (notifications, broadcasts).
    Event {
        /// Event name (e.g. `"notification"`, `"announcement"`).
        event: String,
        /// Event payload.
        payload: serde_json::Value,
        /// When the event was emitted.
        timestamp: DateTime<Utc>,
    },
    /// The server is shutting down; the connection will be closed.
    Shutdown {
        /// Reason for shutdown.
        reason: String,
    },
}

impl OutboundMessage {
    /// Build an event message stamped now.
    pub fn event(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::Event {
            event: event.into(),
            payload,
            timestamp: Utc::now(),
        }
    }
}
