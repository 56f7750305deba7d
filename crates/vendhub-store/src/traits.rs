//! Store collaborator traits.
//!
//! Each trait maps onto the document store's CRUD + filter query
//! surface. Notification writes use whole-record saves with
//! last-write-wins semantics; the store is not assumed to provide
//! stronger transactional guarantees.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vendhub_core::AppResult;
use vendhub_core::types::id::{NotificationId, UserId, VendorId};
use vendhub_entity::notification::Notification;
use vendhub_entity::user::{PreferenceKind, User, UserRole};
use vendhub_entity::vendor::{Vendor, VendorStatus};

/// Persistence for notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new notification record.
    async fn create(&self, notification: &Notification) -> AppResult<()>;

    /// Find a notification by its id.
    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<Notification>>;

    /// Save a full notification record (last-write-wins).
    async fn save(&self, notification: &Notification) -> AppResult<()>;

    /// All notifications for a user, newest first.
    async fn find_for_user(&self, user_id: UserId) -> AppResult<Vec<Notification>>;

    /// Count unread notifications for a user.
    async fn count_unread(&self, user_id: UserId) -> AppResult<u64>;

    /// All notifications whose delivery permanently failed, for admin
    /// inspection.
    async fn find_permanently_failed(&self) -> AppResult<Vec<Notification>>;

    /// Delete one notification. Returns `true` if it existed.
    async fn delete(&self, id: NotificationId) -> AppResult<bool>;

    /// Delete all notifications for a user. Returns the deleted count.
    async fn delete_for_user(&self, user_id: UserId) -> AppResult<u64>;

    /// Delete notifications created before the cutoff, plus any whose
    /// expiry has passed. Returns the deleted count.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// Read access to user records for preference resolution and targeting.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by id.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find several users by id, skipping unknown ids.
    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>>;

    /// All users with the given role.
    async fn find_by_role(&self, role: UserRole) -> AppResult<Vec<User>>;

    /// All users in the given location.
    async fn find_by_location(&self, location: &str) -> AppResult<Vec<User>>;

    /// All users with the given account-level preference enabled.
    async fn find_with_preference(&self, preference: PreferenceKind) -> AppResult<Vec<User>>;

    /// Every user, used by system-wide announcements.
    async fn list_all(&self) -> AppResult<Vec<User>>;
}

/// Read access to vendor records.
#[async_trait]
pub trait VendorDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Find a vendor by id.
    async fn find_by_id(&self, id: VendorId) -> AppResult<Option<Vendor>>;

    /// All vendors with the given onboarding status.
    async fn find_by_status(&self, status: VendorStatus) -> AppResult<Vec<Vendor>>;
}
