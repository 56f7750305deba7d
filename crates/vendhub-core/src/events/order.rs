//! Order domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::{OrderId, UserId, VendorId};

/// Order lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderEvent {
    /// A new order was placed against a vendor.
    Placed {
        /// The order ID.
        order_id: OrderId,
        /// The vendor receiving the order.
        vendor_id: VendorId,
        /// The buyer.
        buyer_id: UserId,
        /// Order total in minor currency units.
        total_cents: i64,
        /// Number of line items.
        item_count: u32,
    },
    /// An order moved to a new status.
    StatusChanged {
        /// The order ID.
        order_id: OrderId,
        /// The vendor owning the order.
        vendor_id: VendorId,
        /// The buyer.
        buyer_id: UserId,
        /// Previous status.
        from: String,
        /// New status.
        to: String,
    },
}
