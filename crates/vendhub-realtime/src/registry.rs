//! Connection registry — lifecycle, room membership, and fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vendhub_core::config::RealtimeConfig;
use vendhub_core::types::id::UserId;
use vendhub_entity::user::{PreferenceSnapshot, User};
use vendhub_entity::vendor::Vendor;

use crate::connection::{ConnectionHandle, ConnectionId, ConnectionPool};
use crate::message::OutboundMessage;
use crate::rooms::{Room, RoomRegistry, rooms_for};

/// Owns every live connection and its room memberships.
///
/// All mutation goes through this type: registration, heartbeats, error
/// accounting, staleness sweeps, and reconciliation against the
/// transport's live set. Emission methods return how many connections
/// accepted the message.
#[derive(Debug)]
pub struct ConnectionRegistry {
    config: RealtimeConfig,
    pool: ConnectionPool,
    rooms: RoomRegistry,
    total_connections: AtomicU64,
    total_disconnections: AtomicU64,
}

impl ConnectionRegistry {
    /// Create a registry with the given limits.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            config,
            pool: ConnectionPool::new(),
            rooms: RoomRegistry::new(),
            total_connections: AtomicU64::new(0),
            total_disconnections: AtomicU64::new(0),
        }
    }

    /// Register a new connection for a user.
    ///
    /// Computes the effective preference snapshot, joins the derived
    /// room set, and returns the handle plus the receiver half of its
    /// outbound channel. If the user is already at the per-user
    /// connection limit, the oldest connection is evicted first.
    pub fn register(
        &self,
        user: &User,
        vendor: Option<&Vendor>,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let existing = self.pool.user_connections(&user.id);
        if existing.len() >= self.config.max_connections_per_user {
            if let Some(oldest) = existing.iter().min_by_key(|c| c.connected_at) {
                warn!(
                    user_id = %user.id,
                    evicted = %oldest.id,
                    limit = self.config.max_connections_per_user,
                    "Per-user connection limit reached, evicting oldest connection"
                );
                self.disconnect(&oldest.id, "connection limit exceeded");
            }
        }

        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(
            user.id,
            user.role,
            user.vendor_id,
            tx,
        ));
        self.pool.add(handle.clone());

        let snapshot =
            PreferenceSnapshot::merge(&user.preferences, vendor.map(|v| &v.settings));
        self.rooms
            .set_rooms(handle.id, rooms_for(user, vendor, &snapshot));
        self.total_connections.fetch_add(1, Ordering::Relaxed);

        info!(
            conn_id = %handle.id,
            user_id = %user.id,
            role = %user.role,
            total = self.pool.connection_count(),
            "Connection registered"
        );
        (handle, rx)
    }

    /// Disconnect a connection and leave all of its rooms.
    pub fn disconnect(&self, conn_id: &ConnectionId, reason: &str) {
        self.rooms.remove_connection(conn_id);
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            self.total_disconnections.fetch_add(1, Ordering::Relaxed);
            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                reason = reason,
                duration_ms = handle.duration().num_milliseconds(),
                errors = handle.error_count(),
                "Connection closed"
            );
        }
    }

    /// Record a heartbeat from a connection.
    pub fn heartbeat(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.get(conn_id) {
            handle.record_heartbeat();
        }
    }

    /// Record a transport error for a connection.
    ///
    /// When the error count reaches the configured threshold the
    /// connection is disconnected immediately, without waiting for the
    /// staleness sweep. Returns `true` if the connection was dropped.
    pub fn record_error(&self, conn_id: &ConnectionId) -> bool {
        let Some(handle) = self.pool.get(conn_id) else {
            return false;
        };
        let count = handle.record_error();
        if count >= self.config.error_disconnect_threshold {
            warn!(
                conn_id = %conn_id,
                errors = count,
                "Error threshold reached, disconnecting"
            );
            self.disconnect(conn_id, "error threshold exceeded");
            true
        } else {
            false
        }
    }

    /// Recompute and apply room membership for all of a user's
    /// connections, after a preference or vendor-settings change.
    pub fn refresh_rooms(&self, user: &User, vendor: Option<&Vendor>) {
        let snapshot =
            PreferenceSnapshot::merge(&user.preferences, vendor.map(|v| &v.settings));
        let target = rooms_for(user, vendor, &snapshot);
        for handle in self.pool.user_connections(&user.id) {
            self.rooms.set_rooms(handle.id, target.clone());
        }
        debug!(user_id = %user.id, rooms = target.len(), "Room membership refreshed");
    }

    /// Drop every connection whose last heartbeat is older than the
    /// configured staleness window. Returns the number dropped.
    pub fn sweep_stale(&self) -> usize {
        let cutoff = chrono::Duration::seconds(self.config.stale_after_seconds);
        let stale: Vec<ConnectionId> = self
            .pool
            .all_connections()
            .into_iter()
            .filter(|c| c.heartbeat_age() > cutoff)
            .map(|c| c.id)
            .collect();
        for conn_id in &stale {
            self.disconnect(conn_id, "heartbeat timeout");
        }
        if !stale.is_empty() {
            info!(dropped = stale.len(), "Stale connection sweep completed");
        }
        stale.len()
    }

    /// Drop registry entries whose connection the transport no longer
    /// reports as live. Returns the number purged.
    pub fn reconcile(&self, live: &[ConnectionId]) -> usize {
        let dead: Vec<ConnectionId> = self
            .pool
            .all_connections()
            .into_iter()
            .filter(|c| !live.contains(&c.id) || !c.is_alive())
            .map(|c| c.id)
            .collect();
        for conn_id in &dead {
            self.disconnect(conn_id, "reconciliation purge");
        }
        if !dead.is_empty() {
            info!(purged = dead.len(), "Registry reconciled against live set");
        }
        dead.len()
    }

    /// Send an event to every connection of one user.
    pub fn emit_to_user(&self, user_id: &UserId, event: &str, payload: &Value) -> u64 {
        let msg = OutboundMessage::event(event, payload.clone());
        self.pool
            .user_connections(user_id)
            .iter()
            .filter(|c| c.send(msg.clone()))
            .count() as u64
    }

    /// Send an event to every connection in a room.
    pub fn emit_to_room(&self, room: &Room, event: &str, payload: &Value) -> u64 {
        let msg = OutboundMessage::event(event, payload.clone());
        let mut delivered = 0u64;
        for conn_id in self.rooms.room_members(room) {
            if let Some(handle) = self.pool.get(&conn_id) {
                if handle.send(msg.clone()) {
                    delivered += 1;
                }
            }
        }
        debug!(room = %room, event = event, delivered, "Room fan-out");
        delivered
    }

    /// Send an event to every connection.
    pub fn emit_to_all(&self, event: &str, payload: &Value) -> u64 {
        let msg = OutboundMessage::event(event, payload.clone());
        self.pool
            .all_connections()
            .iter()
            .filter(|c| c.send(msg.clone()))
            .count() as u64
    }

    /// Whether a user currently has at least one live connection.
    pub fn is_user_connected(&self, user_id: &UserId) -> bool {
        self.pool
            .user_connections(user_id)
            .iter()
            .any(|c| c.is_alive())
    }

    /// IDs of every registered connection.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.pool.all_connections().iter().map(|c| c.id).collect()
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Lifetime count of connections ever registered.
    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    /// Lifetime count of connections closed, for any reason.
    pub fn total_disconnections(&self) -> u64 {
        self.total_disconnections.load(Ordering::Relaxed)
    }

    /// Send a shutdown notice to every connection, then drop them all.
    pub fn close_all(&self, reason: &str) {
        let notice = OutboundMessage::Shutdown {
            reason: reason.to_string(),
        };
        for handle in self.pool.all_connections() {
            handle.send(notice.clone());
            self.disconnect(&handle.id, reason);
        }
    }

    /// Room membership index, for transports that need direct access.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// The limits this registry was built with.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}
