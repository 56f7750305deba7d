//! Broadcast targeting resolution.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vendhub_core::AppError;
use vendhub_core::AppResult;
use vendhub_core::types::id::UserId;
use vendhub_entity::user::{PreferenceKind, User, UserRole};
use vendhub_entity::vendor::VendorStatus;
use vendhub_store::{UserDirectory, VendorDirectory};

/// The targeting criteria of one broadcast.
///
/// Dimensions are additive: the recipient set is the union of every
/// dimension's matches. An entirely empty target is a validation error;
/// criteria that match nobody yield a valid empty resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastTarget {
    /// Explicit recipient ids.
    #[serde(default)]
    pub user_ids: Vec<UserId>,
    /// Every user holding one of these roles.
    #[serde(default)]
    pub roles: Vec<UserRole>,
    /// Owners of vendors in one of these statuses.
    #[serde(default)]
    pub vendor_statuses: Vec<VendorStatus>,
    /// Every user with one of these preferences enabled.
    #[serde(default)]
    pub preferences: Vec<PreferenceKind>,
    /// Every user in one of these locations.
    #[serde(default)]
    pub locations: Vec<String>,
    /// Every user, for system-wide announcements.
    #[serde(default)]
    pub all_users: bool,
}

impl BroadcastTarget {
    /// A target naming explicit recipients.
    pub fn users(user_ids: Vec<UserId>) -> Self {
        Self {
            user_ids,
            ..Default::default()
        }
    }

    /// A target covering one role.
    pub fn role(role: UserRole) -> Self {
        Self {
            roles: vec![role],
            ..Default::default()
        }
    }

    /// A target covering owners of vendors in one status.
    pub fn vendor_status(status: VendorStatus) -> Self {
        Self {
            vendor_statuses: vec![status],
            ..Default::default()
        }
    }

    /// A target covering one enabled preference.
    pub fn preference(preference: PreferenceKind) -> Self {
        Self {
            preferences: vec![preference],
            ..Default::default()
        }
    }

    /// A target covering every user.
    pub fn everyone() -> Self {
        Self {
            all_users: true,
            ..Default::default()
        }
    }

    /// Add a role dimension.
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.roles.push(role);
        self
    }

    /// Add a preference dimension.
    pub fn with_preference(mut self, preference: PreferenceKind) -> Self {
        self.preferences.push(preference);
        self
    }

    /// Add explicit recipients.
    pub fn with_users(mut self, user_ids: Vec<UserId>) -> Self {
        self.user_ids.extend(user_ids);
        self
    }

    /// Whether no criterion was supplied at all.
    pub fn is_empty(&self) -> bool {
        !self.all_users
            && self.user_ids.is_empty()
            && self.roles.is_empty()
            && self.vendor_statuses.is_empty()
            && self.preferences.is_empty()
            && self.locations.is_empty()
    }
}

/// The outcome of resolving one target.
#[derive(Debug, Default)]
pub struct TargetingResolution {
    /// Deduplicated recipients, in first-seen order. When a user matches
    /// several dimensions the last-seen record wins.
    pub recipients: Vec<User>,
    /// Human-readable per-dimension resolution failures. A failing
    /// dimension never aborts the others.
    pub errors: Vec<String>,
}

/// Resolves broadcast targets into concrete recipient lists.
#[derive(Debug, Clone)]
pub struct TargetingResolver {
    users: Arc<dyn UserDirectory>,
    vendors: Arc<dyn VendorDirectory>,
}

impl TargetingResolver {
    /// Create a resolver over the given directories.
    pub fn new(users: Arc<dyn UserDirectory>, vendors: Arc<dyn VendorDirectory>) -> Self {
        Self { users, vendors }
    }

    /// Resolve a target into a deduplicated recipient list.
    pub async fn resolve(&self, target: &BroadcastTarget) -> AppResult<TargetingResolution> {
        if target.is_empty() {
            return Err(AppError::targeting(
                "Broadcast target carries no criteria: supply ids, roles, statuses, \
                 preferences, locations, or all_users",
            ));
        }

        let mut matched: Vec<User> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        if !target.user_ids.is_empty() {
            match self.users.find_by_ids(&target.user_ids).await {
                Ok(users) => matched.extend(users),
                Err(err) => errors.push(format!("user_ids: {err}")),
            }
        }

        for role in &target.roles {
            match self.users.find_by_role(*role).await {
                Ok(users) => matched.extend(users),
                Err(err) => errors.push(format!("role {role}: {err}")),
            }
        }

        for status in &target.vendor_statuses {
            match self.resolve_vendor_status(*status).await {
                Ok(users) => matched.extend(users),
                Err(err) => errors.push(format!("vendor status {status}: {err}")),
            }
        }

        for preference in &target.preferences {
            match self.users.find_with_preference(*preference).await {
                Ok(users) => matched.extend(users),
                Err(err) => errors.push(format!("preference {preference}: {err}")),
            }
        }

        for location in &target.locations {
            match self.users.find_by_location(location).await {
                Ok(users) => matched.extend(users),
                Err(err) => errors.push(format!("location {location}: {err}")),
            }
        }

        if target.all_users {
            match self.users.list_all().await {
                Ok(users) => matched.extend(users),
                Err(err) => errors.push(format!("all_users: {err}")),
            }
        }

        if !errors.is_empty() {
            warn!(
                errors = errors.len(),
                "Some targeting dimensions failed to resolve"
            );
        }

        let recipients = dedup_last_seen(matched);
        debug!(recipients = recipients.len(), "Broadcast target resolved");
        Ok(TargetingResolution { recipients, errors })
    }

    async fn resolve_vendor_status(&self, status: VendorStatus) -> AppResult<Vec<User>> {
        let vendors = self.vendors.find_by_status(status).await?;
        let owner_ids: Vec<UserId> = vendors.iter().map(|v| v.owner_id).collect();
        self.users.find_by_ids(&owner_ids).await
    }
}

/// Deduplicate by user id. Position follows the first occurrence; the
/// record itself follows the last, so later dimensions can enrich a
/// recipient already matched by an earlier one.
fn dedup_last_seen(users: Vec<User>) -> Vec<User> {
    let mut order: Vec<UserId> = Vec::new();
    let mut latest: HashMap<UserId, User> = HashMap::new();
    for user in users {
        if !latest.contains_key(&user.id) {
            order.push(user.id);
        }
        latest.insert(user.id, user);
    }
    order
        .into_iter()
        .filter_map(|id| latest.remove(&id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendhub_entity::vendor::Vendor;
    use vendhub_store::memory::{MemoryUserDirectory, MemoryVendorDirectory};

    fn resolver() -> (
        TargetingResolver,
        Arc<MemoryUserDirectory>,
        Arc<MemoryVendorDirectory>,
    ) {
        let users = Arc::new(MemoryUserDirectory::new());
        let vendors = Arc::new(MemoryVendorDirectory::new());
        (
            TargetingResolver::new(users.clone(), vendors.clone()),
            users,
            vendors,
        )
    }

    #[tokio::test]
    async fn test_empty_target_is_an_error() {
        let (resolver, _, _) = resolver();
        let err = resolver.resolve(&BroadcastTarget::default()).await.unwrap_err();
        assert_eq!(err.kind, vendhub_core::error::ErrorKind::Targeting);
    }

    #[tokio::test]
    async fn test_criteria_matching_nobody_is_empty_not_error() {
        let (resolver, _, _) = resolver();
        let resolution = resolver
            .resolve(&BroadcastTarget::role(UserRole::Admin))
            .await
            .unwrap();
        assert!(resolution.recipients.is_empty());
        assert!(resolution.errors.is_empty());
    }

    #[tokio::test]
    async fn test_dimensions_union_and_dedup() {
        let (resolver, users, vendors) = resolver();

        let admin = User::new("a@test", "Admin", UserRole::Admin);
        let owner = User::new("v@test", "Owner", UserRole::Vendor);
        let vendor = Vendor::new(owner.id, "Acme").with_status(VendorStatus::Active);
        let owner = owner.with_vendor(vendor.id);
        users.insert(admin.clone());
        users.insert(owner.clone());
        vendors.insert(vendor);

        // The admin matches both the role dimension and the explicit id;
        // they must appear exactly once.
        let target = BroadcastTarget::role(UserRole::Admin)
            .with_users(vec![admin.id])
            .with_role(UserRole::Vendor);
        let resolution = resolver.resolve(&target).await.unwrap();

        assert_eq!(resolution.recipients.len(), 2);
        let ids: Vec<UserId> = resolution.recipients.iter().map(|u| u.id).collect();
        assert!(ids.contains(&admin.id));
        assert!(ids.contains(&owner.id));
    }

    #[tokio::test]
    async fn test_vendor_status_resolves_to_owner() {
        let (resolver, users, vendors) = resolver();

        let owner = User::new("v@test", "Owner", UserRole::Vendor);
        let active = Vendor::new(owner.id, "Acme").with_status(VendorStatus::Active);
        let owner = owner.with_vendor(active.id);
        users.insert(owner.clone());
        vendors.insert(active);

        let other = User::new("p@test", "Pending", UserRole::Vendor);
        let pending = Vendor::new(other.id, "Maybe Ltd");
        users.insert(other.with_vendor(pending.id));
        vendors.insert(pending);

        let resolution = resolver
            .resolve(&BroadcastTarget::vendor_status(VendorStatus::Active))
            .await
            .unwrap();
        assert_eq!(resolution.recipients.len(), 1);
        assert_eq!(resolution.recipients[0].id, owner.id);
    }

    #[tokio::test]
    async fn test_all_users_targets_everyone() {
        let (resolver, users, _) = resolver();
        users.insert(User::new("a@test", "A", UserRole::Admin));
        users.insert(User::new("b@test", "B", UserRole::Customer));

        let resolution = resolver
            .resolve(&BroadcastTarget::everyone())
            .await
            .unwrap();
        assert_eq!(resolution.recipients.len(), 2);
    }
}
