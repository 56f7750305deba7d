//! In-memory user directory.

use async_trait::async_trait;
use dashmap::DashMap;

use vendhub_core::AppResult;
use vendhub_core::types::id::UserId;
use vendhub_entity::user::{PreferenceKind, User, UserRole};

use crate::traits::UserDirectory;

/// In-memory user directory keyed by user id.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: DashMap<UserId, User>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user record.
    pub fn insert(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Remove a user record.
    pub fn remove(&self, id: UserId) -> Option<User> {
        self.users.remove(&id).map(|(_, user)| user)
    }
}

fn preference_enabled(user: &User, preference: PreferenceKind) -> bool {
    match preference {
        PreferenceKind::LowStock => user.preferences.low_stock,
        PreferenceKind::NewOrders => user.preferences.new_orders,
        PreferenceKind::SystemUpdates => user.preferences.system_alerts,
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn find_by_role(&self, role: UserRole) -> AppResult<Vec<User>> {
        Ok(self
            .users
            .iter()
            .filter(|entry| entry.value().role == role)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_by_location(&self, location: &str) -> AppResult<Vec<User>> {
        Ok(self
            .users
            .iter()
            .filter(|entry| entry.value().location.as_deref() == Some(location))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_with_preference(&self, preference: PreferenceKind) -> AppResult<Vec<User>> {
        Ok(self
            .users
            .iter()
            .filter(|entry| preference_enabled(entry.value(), preference))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        Ok(self.users.iter().map(|entry| entry.value().clone()).collect())
    }
}
