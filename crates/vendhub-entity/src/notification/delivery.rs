//! Per-channel delivery outcome record embedded in a notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one channel's delivery try.
///
/// One record per channel per notification; a retried attempt overwrites
/// the prior record for that channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelAttempt {
    /// Whether delivery was attempted on this channel at all.
    pub attempted: bool,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Error detail for a failed attempt.
    pub error: Option<String>,
    /// When the attempt finished.
    pub at: Option<DateTime<Utc>>,
}

impl ChannelAttempt {
    /// A successful attempt stamped now.
    pub fn succeeded() -> Self {
        Self {
            attempted: true,
            success: true,
            error: None,
            at: Some(Utc::now()),
        }
    }

    /// A failed attempt stamped now.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            attempted: true,
            success: false,
            error: Some(error.into()),
            at: Some(Utc::now()),
        }
    }

}

/// Aggregate delivery state for one notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Real-time channel outcome.
    pub realtime: ChannelAttempt,
    /// Email channel outcome.
    pub email: ChannelAttempt,
    /// Whether email was used as a fallback after a real-time failure.
    pub fallback_used: bool,
    /// Monotonically incrementing delivery attempt counter, covering the
    /// initial attempt and every retry.
    pub attempts: u32,
    /// Set once the retry scheduler has exhausted all attempts.
    pub permanently_failed: bool,
    /// Stamped when a scheduled retry eventually succeeded.
    pub retry_succeeded_at: Option<DateTime<Utc>>,
}

impl DeliveryRecord {
    /// Whether any channel delivered the notification.
    pub fn delivered(&self) -> bool {
        self.realtime.success || self.email.success
    }
}
