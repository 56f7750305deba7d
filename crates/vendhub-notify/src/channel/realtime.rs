//! Real-time push delivery channel.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use vendhub_core::AppError;
use vendhub_core::AppResult;
use vendhub_core::traits::RoomTransport;
use vendhub_entity::notification::Notification;
use vendhub_entity::user::User;

use super::{ChannelKind, DeliveryChannel};

/// Event name used for direct notification pushes.
pub const NOTIFICATION_EVENT: &str = "notification";

/// Pushes notifications to the recipient's live connections.
#[derive(Debug, Clone)]
pub struct RealtimeChannel {
    transport: Arc<dyn RoomTransport>,
}

impl RealtimeChannel {
    /// Create a channel over the given transport.
    pub fn new(transport: Arc<dyn RoomTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl DeliveryChannel for RealtimeChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Realtime
    }

    async fn deliver(&self, notification: &Notification, recipient: &User) -> AppResult<()> {
        if !self.transport.is_reachable(recipient.id) {
            return Err(AppError::delivery(format!(
                "Recipient {} has no live connection",
                recipient.id
            )));
        }

        let payload = serde_json::to_value(notification)?;
        let delivered = self
            .transport
            .emit_to_user(recipient.id, NOTIFICATION_EVENT, &payload)
            .await?;
        if delivered == 0 {
            return Err(AppError::delivery(format!(
                "No connection accepted the push for user {}",
                recipient.id
            )));
        }

        debug!(
            notification_id = %notification.id,
            user_id = %recipient.id,
            connections = delivered,
            "Real-time push delivered"
        );
        Ok(())
    }
}
