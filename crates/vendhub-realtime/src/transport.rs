//! In-process [`RoomTransport`] backed by the connection registry.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use vendhub_core::result::AppResult;
use vendhub_core::traits::RoomTransport;
use vendhub_core::types::id::UserId;

use crate::registry::ConnectionRegistry;
use crate::rooms::Room;

/// Transport that publishes directly through a local [`ConnectionRegistry`].
///
/// Room names arrive as strings from callers that do not know the room
/// taxonomy; they are parsed into structured [`Room`] values before
/// fan-out, so a malformed name is an error rather than a silent miss.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    registry: Arc<ConnectionRegistry>,
}

impl LocalTransport {
    /// Wrap a registry.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RoomTransport for LocalTransport {
    async fn emit_to_user(
        &self,
        user_id: UserId,
        event: &str,
        payload: &serde_json::Value,
    ) -> AppResult<u64> {
        Ok(self.registry.emit_to_user(&user_id, event, payload))
    }

    async fn emit_to_room(
        &self,
        room: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> AppResult<u64> {
        let room: Room = room.parse()?;
        Ok(self.registry.emit_to_room(&room, event, payload))
    }

    async fn emit_to_all(&self, event: &str, payload: &serde_json::Value) -> AppResult<u64> {
        Ok(self.registry.emit_to_all(event, payload))
    }

    fn is_reachable(&self, user_id: UserId) -> bool {
        self.registry.is_user_connected(&user_id)
    }

    fn live_connection_ids(&self) -> Vec<Uuid> {
        self.registry.connection_ids()
    }
}
