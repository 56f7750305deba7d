//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendhub_core::types::id::{NotificationId, UserId};

use super::category::NotificationCategory;
use super::delivery::DeliveryRecord;
use super::kind::NotificationKind;
use super::priority::NotificationPriority;

/// A notification directed at one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// Event kind that produced this notification.
    pub kind: NotificationKind,
    /// Category derived from the kind.
    pub category: NotificationCategory,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Additional structured data (JSON).
    pub metadata: serde_json::Value,
    /// Priority level.
    pub priority: NotificationPriority,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was read. Set if and only if `is_read`.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Per-channel delivery outcomes.
    pub delivery: DeliveryRecord,
}

impl Notification {
    /// Create a new unread notification with default priority for its kind.
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            kind,
            category: kind.category(),
            title: title.into(),
            message: message.into(),
            metadata,
            priority: kind.default_priority(),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
            expires_at: None,
            delivery: DeliveryRecord::default(),
        }
    }

    /// Set an explicit priority.
    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set an expiry timestamp.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Check if the notification has been read.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    /// Check if the notification has expired.
    ///
    /// Expired notifications are immutable except for deletion.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp <= Utc::now()).unwrap_or(false)
    }

    /// Mark the notification as read, stamping `read_at`.
    pub fn mark_read(&mut self) {
        self.is_read = true;
        self.read_at = Some(Utc::now());
    }

    /// Mark the notification as unread, clearing `read_at`.
    pub fn mark_unread(&mut self) {
        self.is_read = false;
        self.read_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_notification_is_unread() {
        let n = Notification::new(
            UserId::new(),
            NotificationKind::NewOrder,
            "New order",
            "Order #42 placed",
            serde_json::json!({}),
        );
        assert!(n.is_unread());
        assert!(n.read_at.is_none());
        assert_eq!(n.category, NotificationCategory::Order);
    }

    #[test]
    fn test_read_implies_timestamp() {
        let mut n = Notification::new(
            UserId::new(),
            NotificationKind::General,
            "t",
            "m",
            serde_json::json!({}),
        );
        n.mark_read();
        assert!(n.is_read);
        assert!(n.read_at.is_some());
        n.mark_unread();
        assert!(n.read_at.is_none());
    }

    #[test]
    fn test_expiry() {
        let n = Notification::new(
            UserId::new(),
            NotificationKind::General,
            "t",
            "m",
            serde_json::json!({}),
        )
        .with_expiry(Utc::now() - Duration::seconds(1));
        assert!(n.is_expired());
    }
}
