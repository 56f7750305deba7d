//! Notification delivery and retry configuration.

use serde::{Deserialize, Serialize};

/// Settings for the delivery pipeline and retry scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Retry backoff table in milliseconds, indexed by attempt count.
    ///
    /// Attempt indices beyond the table length are clamped to the last
    /// entry. The sequence does not reset between attempts for the same
    /// notification.
    #[serde(default = "default_retry_delays")]
    pub retry_delays_ms: Vec<u64>,
    /// Maximum retry attempts per notification before it is marked
    /// permanently failed.
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    /// Whether a failed real-time delivery falls back to email.
    #[serde(default = "default_true")]
    pub email_fallback: bool,
}

impl DeliveryConfig {
    /// Return the retry delay for the given attempt index, clamped to the
    /// last entry of the backoff table.
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        let idx = (attempt as usize).min(self.retry_delays_ms.len().saturating_sub(1));
        self.retry_delays_ms.get(idx).copied().unwrap_or(0)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            retry_delays_ms: default_retry_delays(),
            max_retry_attempts: default_max_retry_attempts(),
            email_fallback: true,
        }
    }
}

fn default_retry_delays() -> Vec<u64> {
    vec![1_000, 5_000, 15_000]
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_true() -> bool {
    true
}
