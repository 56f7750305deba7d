//! Real-time transport trait.
//!
//! The socket accept loop, authentication handshake, and wire framing
//! live outside this workspace. The notification platform only needs
//! room-based publish primitives plus enough visibility into the live
//! connection set to detect missed disconnects.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::id::UserId;

/// Room-based publish/subscribe primitive exposed by the real-time layer.
#[async_trait]
pub trait RoomTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Emit an event to every connection in a user's personal room.
    /// Returns the number of connections the message was handed to.
    async fn emit_to_user(
        &self,
        user_id: UserId,
        event: &str,
        payload: &serde_json::Value,
    ) -> AppResult<u64>;

    /// Emit an event to every connection in a named room.
    async fn emit_to_room(
        &self,
        room: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> AppResult<u64>;

    /// Emit an event to every live connection.
    async fn emit_to_all(&self, event: &str, payload: &serde_json::Value) -> AppResult<u64>;

    /// Whether the user currently has at least one live connection.
    fn is_reachable(&self, user_id: UserId) -> bool;

    /// Authoritative list of live connection ids, used by the registry's
    /// reconciliation sweep to purge orphaned entries.
    fn live_connection_ids(&self) -> Vec<Uuid>;
}
