//! Notification category enumeration.

use serde::{Deserialize, Serialize};

/// Category of a notification for filtering and preference matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// Product and inventory notifications.
    Product,
    /// Order lifecycle notifications.
    Order,
    /// System-level notifications and announcements.
    System,
    /// Account change notifications.
    Account,
    /// Commission settlement notifications.
    Commission,
}

impl NotificationCategory {
    /// Return the category as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Order => "order",
            Self::System => "system",
            Self::Account => "account",
            Self::Commission => "commission",
        }
    }
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
