//! System-level domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// System-level events (lifecycle, maintenance).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemEvent {
    /// The server started up.
    ServerStarted {
        /// Server version.
        version: String,
    },
    /// The server is shutting down.
    ServerShutdown {
        /// Reason for shutdown.
        reason: String,
    },
    /// A maintenance window was scheduled.
    MaintenanceScheduled {
        /// When maintenance begins.
        starts_at: DateTime<Utc>,
        /// Expected duration in minutes.
        duration_minutes: u32,
        /// Operator-supplied description.
        description: String,
    },
}
