//! Account and commission domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::{UserId, VendorId};

/// Account-level events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccountEvent {
    /// A commission payment was settled for a vendor.
    CommissionPaid {
        /// The vendor paid.
        vendor_id: VendorId,
        /// Settled amount in minor currency units.
        amount_cents: i64,
        /// Settlement period label (e.g. `"2026-08"`).
        period: String,
    },
    /// A user's account details changed.
    AccountUpdated {
        /// The affected user.
        user_id: UserId,
        /// Which fields changed.
        fields: Vec<String>,
    },
    /// A vendor's onboarding status changed.
    VendorStatusChanged {
        /// The vendor.
        vendor_id: VendorId,
        /// The vendor's owner account.
        owner_id: UserId,
        /// New status.
        status: String,
    },
}
