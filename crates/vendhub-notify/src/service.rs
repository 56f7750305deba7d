//! Notification CRUD service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use vendhub_core::AppError;
use vendhub_core::AppResult;
use vendhub_core::types::id::{NotificationId, UserId};
use vendhub_entity::notification::Notification;
use vendhub_store::NotificationStore;

use crate::retry::RetryScheduler;

/// Read/update/delete surface over stored notifications.
///
/// Expired notifications are immutable: read-state mutations are
/// rejected, deletion is always allowed.
#[derive(Debug)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    retry: Arc<RetryScheduler>,
}

impl NotificationService {
    /// Create a service over the given store.
    pub fn new(store: Arc<dyn NotificationStore>, retry: Arc<RetryScheduler>) -> Self {
        Self { store, retry }
    }

    /// All notifications for a user, newest first.
    pub async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Notification>> {
        self.store.find_for_user(user_id).await
    }

    /// Unread count for a user.
    pub async fn unread_count(&self, user_id: UserId) -> AppResult<u64> {
        self.store.count_unread(user_id).await
    }

    /// Mark one notification read.
    pub async fn mark_read(&self, id: NotificationId) -> AppResult<Notification> {
        let mut notification = self.load_mutable(id).await?;
        if notification.is_read {
            return Ok(notification);
        }
        notification.mark_read();
        self.store.save(&notification).await?;
        debug!(notification_id = %id, "Notification marked read");
        Ok(notification)
    }

    /// Mark one notification unread again.
    pub async fn mark_unread(&self, id: NotificationId) -> AppResult<Notification> {
        let mut notification = self.load_mutable(id).await?;
        if !notification.is_read {
            return Ok(notification);
        }
        notification.mark_unread();
        self.store.save(&notification).await?;
        debug!(notification_id = %id, "Notification marked unread");
        Ok(notification)
    }

    /// Mark every unread, unexpired notification of a user read. Returns
    /// how many records changed.
    pub async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let mut updated = 0u64;
        for mut notification in self.store.find_for_user(user_id).await? {
            if notification.is_read || notification.is_expired() {
                continue;
            }
            notification.mark_read();
            self.store.save(&notification).await?;
            updated += 1;
        }
        debug!(user_id = %user_id, updated, "Marked all read");
        Ok(updated)
    }

    /// Delete one notification, cancelling any pending retry.
    pub async fn delete(&self, id: NotificationId) -> AppResult<()> {
        self.retry.cancel(id);
        if !self.store.delete(id).await? {
            return Err(AppError::not_found(format!("Notification not found: {id}")));
        }
        debug!(notification_id = %id, "Notification deleted");
        Ok(())
    }

    /// Delete every notification of a user. Returns the deleted count.
    pub async fn delete_all_for_user(&self, user_id: UserId) -> AppResult<u64> {
        for notification in self.store.find_for_user(user_id).await? {
            self.retry.cancel(notification.id);
        }
        let deleted = self.store.delete_for_user(user_id).await?;
        info!(user_id = %user_id, deleted, "Deleted all notifications for user");
        Ok(deleted)
    }

    /// Delete notifications older than the given age, plus any whose
    /// expiry has passed. Returns the deleted count.
    pub async fn cleanup(&self, older_than_days: u32) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(older_than_days));
        let deleted = self.store.delete_older_than(cutoff).await?;
        info!(older_than_days, deleted, "Retention cleanup completed");
        Ok(deleted)
    }

    /// Notifications whose delivery permanently failed, for admin
    /// inspection.
    pub async fn failed_deliveries(&self) -> AppResult<Vec<Notification>> {
        self.store.find_permanently_failed().await
    }

    async fn load_mutable(&self, id: NotificationId) -> AppResult<Notification> {
        let notification = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification not found: {id}")))?;
        if notification.is_expired() {
            return Err(AppError::validation(format!(
                "Notification {id} has expired and cannot be modified"
            )));
        }
        Ok(notification)
    }
}
