//! In-memory notification store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use vendhub_core::AppResult;
use vendhub_core::types::id::{NotificationId, UserId};
use vendhub_entity::notification::Notification;

use crate::traits::NotificationStore;

/// In-memory notification store keyed by notification id.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    records: DashMap<NotificationId, Notification>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stored notifications.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, notification: &Notification) -> AppResult<()> {
        self.records.insert(notification.id, notification.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, notification: &Notification) -> AppResult<()> {
        self.records.insert(notification.id, notification.clone());
        Ok(())
    }

    async fn find_for_user(&self, user_id: UserId) -> AppResult<Vec<Notification>> {
        let mut found: Vec<Notification> = self
            .records
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn count_unread(&self, user_id: UserId) -> AppResult<u64> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.value().user_id == user_id && entry.value().is_unread())
            .count() as u64)
    }

    async fn find_permanently_failed(&self) -> AppResult<Vec<Notification>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.value().delivery.permanently_failed)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn delete(&self, id: NotificationId) -> AppResult<bool> {
        Ok(self.records.remove(&id).is_some())
    }

    async fn delete_for_user(&self, user_id: UserId) -> AppResult<u64> {
        let ids: Vec<NotificationId> = self
            .records
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| *entry.key())
            .collect();
        for id in &ids {
            self.records.remove(id);
        }
        Ok(ids.len() as u64)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let now = Utc::now();
        let ids: Vec<NotificationId> = self
            .records
            .iter()
            .filter(|entry| {
                let n = entry.value();
                n.created_at < cutoff || n.expires_at.map(|exp| exp <= now).unwrap_or(false)
            })
            .map(|entry| *entry.key())
            .collect();
        for id in &ids {
            self.records.remove(id);
        }
        Ok(ids.len() as u64)
    }
}
