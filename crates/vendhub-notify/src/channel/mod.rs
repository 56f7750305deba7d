//! Delivery channel adapters.
//!
//! Each adapter wraps one external transport behind the
//! [`DeliveryChannel`] trait. Adapters return plain `AppResult`s; the
//! orchestrator converts those into per-channel outcome records and
//! never lets a channel failure escape `create_notification`.

pub mod email;
pub mod realtime;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vendhub_core::AppResult;
use vendhub_entity::notification::Notification;
use vendhub_entity::user::User;

pub use email::EmailChannel;
pub use realtime::RealtimeChannel;

/// The delivery channels a notification can go out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Push over the real-time connection.
    Realtime,
    /// Email.
    Email,
}

impl ChannelKind {
    /// Return the channel as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One way of getting a notification to a recipient.
#[async_trait]
pub trait DeliveryChannel: Send + Sync + fmt::Debug + 'static {
    /// Which channel this adapter drives.
    fn kind(&self) -> ChannelKind;

    /// Whether the channel is configured and usable at all. Disabled
    /// channels are skipped, not failed.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Attempt delivery to one recipient. An `Err` is a failed attempt,
    /// recorded on the notification and eligible for retry.
    async fn deliver(&self, notification: &Notification, recipient: &User) -> AppResult<()>;
}
