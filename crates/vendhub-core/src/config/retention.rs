//! Notification retention configuration.

use serde::{Deserialize, Serialize};

/// Settings for the retention cleanup sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Number of days after which read notifications are deleted.
    #[serde(default = "default_cleanup_days")]
    pub cleanup_after_days: u32,
    /// Cron expression for the nightly cleanup job.
    #[serde(default = "default_cleanup_cron")]
    pub cleanup_cron: String,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            cleanup_after_days: default_cleanup_days(),
            cleanup_cron: default_cleanup_cron(),
        }
    }
}

fn default_cleanup_days() -> u32 {
    30
}

fn default_cleanup_cron() -> String {
    // Daily at 2 AM
    "0 0 2 * * *".to_string()
}
