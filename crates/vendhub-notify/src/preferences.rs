//! Effective preference resolution.

use std::sync::Arc;

use vendhub_core::AppError;
use vendhub_core::AppResult;
use vendhub_core::types::id::UserId;
use vendhub_entity::user::{PreferenceSnapshot, User};
use vendhub_store::{UserDirectory, VendorDirectory};

/// Resolves the effective delivery toggles for a recipient.
///
/// For vendor users the account preferences are ANDed with the vendor's
/// notification settings; a missing vendor record falls back to the
/// account preferences alone.
#[derive(Debug, Clone)]
pub struct PreferenceResolver {
    users: Arc<dyn UserDirectory>,
    vendors: Arc<dyn VendorDirectory>,
}

impl PreferenceResolver {
    /// Create a resolver over the given directories.
    pub fn new(users: Arc<dyn UserDirectory>, vendors: Arc<dyn VendorDirectory>) -> Self {
        Self { users, vendors }
    }

    /// Resolve the snapshot for an already-loaded user record.
    pub async fn snapshot_for(&self, user: &User) -> AppResult<PreferenceSnapshot> {
        let vendor = match user.vendor_id {
            Some(vendor_id) => self.vendors.find_by_id(vendor_id).await?,
            None => None,
        };
        Ok(PreferenceSnapshot::merge(
            &user.preferences,
            vendor.as_ref().map(|v| &v.settings),
        ))
    }

    /// Load a user and resolve their snapshot in one step.
    pub async fn resolve(&self, user_id: UserId) -> AppResult<(User, PreferenceSnapshot)> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User not found: {user_id}")))?;
        let snapshot = self.snapshot_for(&user).await?;
        Ok((user, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendhub_entity::user::UserRole;
    use vendhub_entity::vendor::{Vendor, VendorNotificationSettings};
    use vendhub_store::memory::{MemoryUserDirectory, MemoryVendorDirectory};

    #[tokio::test]
    async fn test_resolve_unknown_user_is_not_found() {
        let resolver = PreferenceResolver::new(
            Arc::new(MemoryUserDirectory::new()),
            Arc::new(MemoryVendorDirectory::new()),
        );
        let err = resolver.resolve(UserId::new()).await.unwrap_err();
        assert_eq!(err.kind, vendhub_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_vendor_settings_are_merged() {
        let users = Arc::new(MemoryUserDirectory::new());
        let vendors = Arc::new(MemoryVendorDirectory::new());

        let owner = User::new("v@test", "V", UserRole::Vendor);
        let vendor = Vendor::new(owner.id, "Acme").with_settings(VendorNotificationSettings {
            email_notifications: false,
            ..Default::default()
        });
        let owner = owner.with_vendor(vendor.id);
        users.insert(owner.clone());
        vendors.insert(vendor);

        let resolver = PreferenceResolver::new(users, vendors);
        let (_, snapshot) = resolver.resolve(owner.id).await.unwrap();
        assert!(!snapshot.email);
        assert!(snapshot.realtime);
    }
}
