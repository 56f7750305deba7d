//! Notification delivery preferences and the derived preference snapshot.

use serde::{Deserialize, Serialize};

use crate::notification::kind::NotificationKind;
use crate::vendor::settings::VendorNotificationSettings;

/// Account-level notification delivery preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreferences {
    /// Receive notifications by email.
    #[serde(default = "default_true")]
    pub email_enabled: bool,
    /// Receive notifications over the real-time channel.
    #[serde(default = "default_true")]
    pub push_enabled: bool,
    /// Low stock and volume alerts.
    #[serde(default = "default_true")]
    pub low_stock: bool,
    /// New order and order status notifications.
    #[serde(default = "default_true")]
    pub new_orders: bool,
    /// System alerts and maintenance notices.
    #[serde(default = "default_true")]
    pub system_alerts: bool,
    /// Commission settlement notifications.
    #[serde(default = "default_true")]
    pub commission_updates: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_enabled: true,
            push_enabled: true,
            low_stock: true,
            new_orders: true,
            system_alerts: true,
            commission_updates: true,
        }
    }
}

/// A broadcastable preference axis, used both for room membership and for
/// preference-targeted broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreferenceKind {
    /// Low stock alerts.
    LowStock,
    /// New order notifications.
    NewOrders,
    /// System update notices.
    SystemUpdates,
}

impl PreferenceKind {
    /// Return the preference as a kebab-case string (room suffix).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowStock => "low-stock",
            Self::NewOrders => "new-orders",
            Self::SystemUpdates => "system-updates",
        }
    }

    /// Whether the given effective snapshot has this preference enabled.
    pub fn enabled_in(&self, snapshot: &PreferenceSnapshot) -> bool {
        match self {
            Self::LowStock => snapshot.low_stock,
            Self::NewOrders => snapshot.new_orders,
            Self::SystemUpdates => snapshot.system_alerts,
        }
    }

    /// All broadcastable preferences.
    pub fn all() -> &'static [PreferenceKind] {
        &[Self::LowStock, Self::NewOrders, Self::SystemUpdates]
    }
}

impl std::fmt::Display for PreferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The merged, effective set of delivery toggles for one user.
///
/// Derived at delivery time from the account-level preferences and, for
/// vendor users, the vendor's notification settings. A toggle is effective
/// only when enabled at *both* levels; a vendor cannot be forced to
/// receive through a channel its settings disable, and vice versa.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    /// Effective email delivery toggle.
    pub email: bool,
    /// Effective real-time delivery toggle.
    pub realtime: bool,
    /// Low stock / volume alert toggle.
    pub low_stock: bool,
    /// Order notification toggle.
    pub new_orders: bool,
    /// System alert toggle.
    pub system_alerts: bool,
    /// Commission notification toggle.
    pub commission_updates: bool,
}

impl PreferenceSnapshot {
    /// Merge account preferences with optional vendor settings.
    pub fn merge(
        prefs: &NotificationPreferences,
        vendor: Option<&VendorNotificationSettings>,
    ) -> Self {
        match vendor {
            Some(v) => Self {
                email: prefs.email_enabled && v.email_notifications,
                realtime: prefs.push_enabled && v.push_notifications,
                low_stock: prefs.low_stock && v.low_stock_alerts,
                new_orders: prefs.new_orders && v.order_alerts,
                system_alerts: prefs.system_alerts,
                commission_updates: prefs.commission_updates && v.commission_alerts,
            },
            None => Self {
                email: prefs.email_enabled,
                realtime: prefs.push_enabled,
                low_stock: prefs.low_stock,
                new_orders: prefs.new_orders,
                system_alerts: prefs.system_alerts,
                commission_updates: prefs.commission_updates,
            },
        }
    }

    /// Whether this snapshot allows notifications of the given kind at all.
    ///
    /// Kinds without a dedicated toggle (moderation results, account
    /// updates, general) are always allowed.
    pub fn allows_kind(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::LowStock | NotificationKind::CubicVolumeAlert => self.low_stock,
            NotificationKind::NewOrder | NotificationKind::OrderStatusUpdate => self.new_orders,
            NotificationKind::SystemMaintenance => self.system_alerts,
            NotificationKind::CommissionPayment => self.commission_updates,
            NotificationKind::ProductApproved
            | NotificationKind::ProductRejected
            | NotificationKind::AccountUpdate
            | NotificationKind::General => true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_without_vendor_is_identity() {
        let prefs = NotificationPreferences {
            email_enabled: false,
            ..Default::default()
        };
        let snap = PreferenceSnapshot::merge(&prefs, None);
        assert!(!snap.email);
        assert!(snap.realtime);
        assert!(snap.low_stock);
    }

    #[test]
    fn test_merge_ands_vendor_settings() {
        let prefs = NotificationPreferences::default();
        let vendor = VendorNotificationSettings {
            email_notifications: true,
            push_notifications: false,
            low_stock_alerts: false,
            order_alerts: true,
            commission_alerts: true,
        };
        let snap = PreferenceSnapshot::merge(&prefs, Some(&vendor));
        assert!(snap.email);
        assert!(!snap.realtime);
        assert!(!snap.low_stock);
        assert!(snap.new_orders);
    }

    #[test]
    fn test_kind_gating() {
        let prefs = NotificationPreferences {
            low_stock: false,
            ..Default::default()
        };
        let snap = PreferenceSnapshot::merge(&prefs, None);
        assert!(!snap.allows_kind(NotificationKind::LowStock));
        assert!(!snap.allows_kind(NotificationKind::CubicVolumeAlert));
        assert!(snap.allows_kind(NotificationKind::ProductApproved));
        assert!(snap.allows_kind(NotificationKind::General));
    }
}
