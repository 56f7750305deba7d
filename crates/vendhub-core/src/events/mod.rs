//! Domain events emitted by marketplace operations.
//!
//! Events are produced by the order, catalog, and account services and
//! consumed by the notification event router, which turns them into
//! notifications and broadcasts.

pub mod account;
pub mod catalog;
pub mod order;
pub mod system;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::UserId;

pub use account::AccountEvent;
pub use catalog::CatalogEvent;
pub use order::OrderEvent;
pub use system::SystemEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<UserId>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// An order-related event.
    Order(OrderEvent),
    /// A catalog/inventory event.
    Catalog(CatalogEvent),
    /// An account or commission event.
    Account(AccountEvent),
    /// A system-level event.
    System(SystemEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<UserId>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}
