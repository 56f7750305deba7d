//! # vendhub-notify
//!
//! Notification orchestration for the VendHub marketplace back-office:
//!
//! - Preference resolution (account preferences ANDed with vendor settings)
//! - Delivery channel adapters (real-time push, email) behind one trait
//! - Fallback delivery with per-channel outcome records
//! - Retry scheduler with a bounded, clamped backoff table
//! - Broadcast targeting resolver and room fan-out broadcasts
//! - Notification CRUD service and delivery statistics
//! - Domain-event router and cron-scheduled retention cleanup

pub mod broadcast;
pub mod channel;
pub mod maintenance;
pub mod orchestrator;
pub mod preferences;
pub mod retry;
pub mod router;
pub mod service;
pub mod stats;
pub mod targeting;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcast::{BroadcastOutcome, BroadcastRequest, Broadcaster};
pub use channel::{ChannelKind, DeliveryChannel, EmailChannel, RealtimeChannel};
pub use orchestrator::{DeliveryFlags, NotificationOrchestrator, NotificationRequest};
pub use preferences::PreferenceResolver;
pub use retry::RetryScheduler;
pub use router::EventRouter;
pub use service::NotificationService;
pub use stats::{DeliveryStats, StatsSnapshot};
pub use targeting::{BroadcastTarget, TargetingResolver, TargetingResolution};
