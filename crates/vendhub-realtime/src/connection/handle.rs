//! Individual real-time connection handle.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use vendhub_core::types::id::{UserId, VendorId};
use vendhub_entity::user::UserRole;

use crate::message::OutboundMessage;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single live connection.
///
/// Holds the sender channel for pushing messages to the client, plus
/// metadata about the connected user. Heartbeat and error bookkeeping
/// are mutated synchronously by transport event handlers.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: UserId,
    /// User's role (cached for room assignment).
    pub role: UserRole,
    /// Vendor attached to the user, if any.
    pub vendor_id: Option<VendorId>,
    /// Sender for outbound messages.
    pub sender: mpsc::Sender<OutboundMessage>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last heartbeat received from the client.
    last_heartbeat: RwLock<DateTime<Utc>>,
    /// Transport error count for this connection.
    error_count: AtomicU32,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new live connection handle.
    pub fn new(
        user_id: UserId,
        role: UserRole,
        vendor_id: Option<VendorId>,
        sender: mpsc::Sender<OutboundMessage>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            role,
            vendor_id,
            sender,
            connected_at: now,
            last_heartbeat: RwLock::new(now),
            error_count: AtomicU32::new(0),
            alive: AtomicBool::new(true),
        }
    }

    /// Send an outbound message to this connection.
    ///
    /// Returns `false` if the connection is dead, its buffer is full, or
    /// the receiving side has gone away.
    pub fn send(&self, msg: OutboundMessage) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Connection send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Record a heartbeat from the client.
    pub fn record_heartbeat(&self) {
        let mut hb = self.last_heartbeat.write().unwrap_or_else(|e| e.into_inner());
        *hb = Utc::now();
    }

    /// Age of the last heartbeat.
    pub fn heartbeat_age(&self) -> chrono::Duration {
        let hb = *self.last_heartbeat.read().unwrap_or_else(|e| e.into_inner());
        Utc::now() - hb
    }

    /// Backdate the last heartbeat, for staleness testing.
    #[cfg(test)]
    pub fn set_last_heartbeat(&self, at: DateTime<Utc>) {
        let mut hb = self.last_heartbeat.write().unwrap_or_else(|e| e.into_inner());
        *hb = at;
    }

    /// Record a transport error. Returns the new error count.
    pub fn record_error(&self) -> u32 {
        self.error_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current transport error count.
    pub fn error_count(&self) -> u32 {
        self.error_count.load(Ordering::SeqCst)
    }

    /// Duration this connection has been open.
    pub fn duration(&self) -> chrono::Duration {
        Utc::now() - self.connected_at
    }
}
