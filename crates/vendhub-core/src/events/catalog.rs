//! Catalog and inventory domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::{ProductId, VendorId};

/// Product and inventory events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// A product's stock fell to or below its alert threshold.
    LowStock {
        /// The product.
        product_id: ProductId,
        /// Product display name.
        product_name: String,
        /// The owning vendor.
        vendor_id: VendorId,
        /// Current stock level.
        current_stock: i64,
        /// Configured alert threshold.
        threshold: i64,
    },
    /// A product's packed cubic volume exceeded its shipping limit.
    CubicVolumeAlert {
        /// The product.
        product_id: ProductId,
        /// Product display name.
        product_name: String,
        /// The owning vendor.
        vendor_id: VendorId,
        /// Measured cubic volume in cubic centimeters.
        cubic_volume_cm3: f64,
        /// Configured limit.
        limit_cm3: f64,
    },
    /// A product passed moderation review.
    ProductApproved {
        /// The product.
        product_id: ProductId,
        /// Product display name.
        product_name: String,
        /// The owning vendor.
        vendor_id: VendorId,
    },
    /// A product failed moderation review.
    ProductRejected {
        /// The product.
        product_id: ProductId,
        /// Product display name.
        product_name: String,
        /// The owning vendor.
        vendor_id: VendorId,
        /// Reviewer's reason.
        reason: String,
    },
}
