//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use vendhub_core::AppError;

use super::category::NotificationCategory;
use super::priority::NotificationPriority;

/// The closed set of notification types the platform produces.
///
/// API boundaries parse incoming type strings with [`FromStr`]; a string
/// outside this set is rejected before any record is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A product's stock fell below its alert threshold.
    LowStock,
    /// A new order was placed against a vendor.
    NewOrder,
    /// An order moved to a new status.
    OrderStatusUpdate,
    /// A product passed moderation review.
    ProductApproved,
    /// A product failed moderation review.
    ProductRejected,
    /// A commission payment was settled.
    CommissionPayment,
    /// A maintenance window announcement.
    SystemMaintenance,
    /// A user's account details changed.
    AccountUpdate,
    /// A product's packed volume exceeded its shipping limit.
    CubicVolumeAlert,
    /// Anything that does not fit a more specific kind.
    General,
}

impl NotificationKind {
    /// The category this kind belongs to, used for preference matching.
    pub fn category(&self) -> NotificationCategory {
        match self {
            Self::LowStock | Self::ProductApproved | Self::ProductRejected => {
                NotificationCategory::Product
            }
            Self::CubicVolumeAlert => NotificationCategory::Product,
            Self::NewOrder | Self::OrderStatusUpdate => NotificationCategory::Order,
            Self::CommissionPayment => NotificationCategory::Commission,
            Self::AccountUpdate => NotificationCategory::Account,
            Self::SystemMaintenance | Self::General => NotificationCategory::System,
        }
    }

    /// The default priority assigned when the producer does not specify one.
    pub fn default_priority(&self) -> NotificationPriority {
        match self {
            Self::LowStock | Self::CubicVolumeAlert => NotificationPriority::High,
            Self::SystemMaintenance => NotificationPriority::Urgent,
            Self::NewOrder | Self::CommissionPayment => NotificationPriority::Medium,
            Self::OrderStatusUpdate
            | Self::ProductApproved
            | Self::ProductRejected
            | Self::AccountUpdate
            | Self::General => NotificationPriority::Low,
        }
    }

    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowStock => "low_stock",
            Self::NewOrder => "new_order",
            Self::OrderStatusUpdate => "order_status_update",
            Self::ProductApproved => "product_approved",
            Self::ProductRejected => "product_rejected",
            Self::CommissionPayment => "commission_payment",
            Self::SystemMaintenance => "system_maintenance",
            Self::AccountUpdate => "account_update",
            Self::CubicVolumeAlert => "cubic_volume_alert",
            Self::General => "general",
        }
    }

    /// All kinds, in declaration order.
    pub fn all() -> &'static [NotificationKind] {
        &[
            Self::LowStock,
            Self::NewOrder,
            Self::OrderStatusUpdate,
            Self::ProductApproved,
            Self::ProductRejected,
            Self::CommissionPayment,
            Self::SystemMaintenance,
            Self::AccountUpdate,
            Self::CubicVolumeAlert,
            Self::General,
        ]
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low_stock" => Ok(Self::LowStock),
            "new_order" => Ok(Self::NewOrder),
            "order_status_update" => Ok(Self::OrderStatusUpdate),
            "product_approved" => Ok(Self::ProductApproved),
            "product_rejected" => Ok(Self::ProductRejected),
            "commission_payment" => Ok(Self::CommissionPayment),
            "system_maintenance" => Ok(Self::SystemMaintenance),
            "account_update" => Ok(Self::AccountUpdate),
            "cubic_volume_alert" => Ok(Self::CubicVolumeAlert),
            "general" => Ok(Self::General),
            _ => Err(AppError::invalid_type(format!(
                "Invalid notification type: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_roundtrip() {
        for kind in NotificationKind::all() {
            let parsed: NotificationKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
    }

    #[test]
    fn test_invalid_kind_rejected() {
        let err = "order_shipped".parse::<NotificationKind>().unwrap_err();
        assert_eq!(err.kind, vendhub_core::error::ErrorKind::InvalidType);
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(
            NotificationKind::LowStock.category(),
            NotificationCategory::Product
        );
        assert_eq!(
            NotificationKind::NewOrder.category(),
            NotificationCategory::Order
        );
        assert_eq!(
            NotificationKind::CommissionPayment.category(),
            NotificationCategory::Commission
        );
        assert_eq!(
            NotificationKind::General.category(),
            NotificationCategory::System
        );
    }
}
