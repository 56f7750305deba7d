//! Connection registry configuration.

use serde::{Deserialize, Serialize};

/// Settings for the real-time connection registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum concurrent connections per user.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Outbound message buffer size per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Interval between staleness sweeps, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Heartbeat age beyond which a connection is considered stale, in seconds.
    #[serde(default = "default_stale_after")]
    pub stale_after_seconds: i64,
    /// Interval between reconciliation passes against the transport, in seconds.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_seconds: u64,
    /// Transport error count at which a connection is forcibly closed.
    #[serde(default = "default_error_threshold")]
    pub error_disconnect_threshold: u32,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            channel_buffer_size: default_channel_buffer(),
            sweep_interval_seconds: default_sweep_interval(),
            stale_after_seconds: default_stale_after(),
            reconcile_interval_seconds: default_reconcile_interval(),
            error_disconnect_threshold: default_error_threshold(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_channel_buffer() -> usize {
    256
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_stale_after() -> i64 {
    60
}

fn default_reconcile_interval() -> u64 {
    300
}

fn default_error_threshold() -> u32 {
    5
}
