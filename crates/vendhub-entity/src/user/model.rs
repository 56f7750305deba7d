//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendhub_core::types::id::{UserId, VendorId};

use super::preference::NotificationPreferences;
use super::role::UserRole;

/// A back-office user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Contact email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// RBAC role.
    pub role: UserRole,
    /// The vendor this account owns, for vendor-role users.
    pub vendor_id: Option<VendorId>,
    /// Optional location label (city or region slug).
    pub location: Option<String>,
    /// Account-level notification preferences.
    pub preferences: NotificationPreferences,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with default preferences.
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            name: name.into(),
            role,
            vendor_id: None,
            location: None,
            preferences: NotificationPreferences::default(),
            created_at: Utc::now(),
        }
    }

    /// Attach a vendor record to this account.
    pub fn with_vendor(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    /// Set the location label.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Replace the notification preferences.
    pub fn with_preferences(mut self, preferences: NotificationPreferences) -> Self {
        self.preferences = preferences;
        self
    }
}
