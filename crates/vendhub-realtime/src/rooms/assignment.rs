//! Deterministic room assignment.
//!
//! The room set for a connection is a pure function of the user record,
//! the attached vendor record (if any), and the effective preference
//! snapshot. Re-running assignment after a preference change yields the
//! new set; the registry diffs old against new to leave and join rooms.

use vendhub_entity::user::{PreferenceKind, PreferenceSnapshot, User};
use vendhub_entity::vendor::Vendor;

use super::name::Room;

/// Compute the full room set for one connection.
pub fn rooms_for(user: &User, vendor: Option<&Vendor>, snapshot: &PreferenceSnapshot) -> Vec<Room> {
    let mut rooms = vec![Room::User(user.id), Room::Role(user.role)];

    if let Some(vendor) = vendor {
        rooms.push(Room::Vendor(vendor.id));
        rooms.push(Room::VendorStatus(vendor.status));
    }

    if let Some(location) = &user.location {
        rooms.push(Room::Location(location.clone()));
    }

    for pref in PreferenceKind::all() {
        if pref.enabled_in(snapshot) {
            rooms.push(Room::Preference(*pref));
        }
    }

    rooms
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendhub_entity::user::{NotificationPreferences, UserRole};
    use vendhub_entity::vendor::{VendorNotificationSettings, VendorStatus};

    fn vendor_user() -> (User, Vendor) {
        let vendor = Vendor::new(
            vendhub_core::types::id::UserId::new(),
            "Acme Stalls".to_string(),
        )
        .with_status(VendorStatus::Active);
        let user = User::new("owner@acme.test", "Acme Owner", UserRole::Vendor)
            .with_vendor(vendor.id);
        (user, vendor)
    }

    #[test]
    fn test_active_vendor_with_only_low_stock_gets_five_rooms() {
        let (mut user, vendor) = vendor_user();
        user.preferences = NotificationPreferences {
            low_stock: true,
            new_orders: false,
            system_alerts: false,
            ..Default::default()
        };
        let snapshot = PreferenceSnapshot::merge(&user.preferences, Some(&vendor.settings));

        let rooms = rooms_for(&user, Some(&vendor), &snapshot);

        assert_eq!(rooms.len(), 5);
        assert!(rooms.contains(&Room::User(user.id)));
        assert!(rooms.contains(&Room::Role(UserRole::Vendor)));
        assert!(rooms.contains(&Room::Vendor(vendor.id)));
        assert!(rooms.contains(&Room::VendorStatus(VendorStatus::Active)));
        assert!(rooms.contains(&Room::Preference(PreferenceKind::LowStock)));
    }

    #[test]
    fn test_customer_without_location_gets_role_and_pref_rooms() {
        let user = User::new("c@shop.test", "Customer", UserRole::Customer);
        let snapshot = PreferenceSnapshot::merge(&user.preferences, None);

        let rooms = rooms_for(&user, None, &snapshot);

        // user + role + three default-enabled preference rooms
        assert_eq!(rooms.len(), 5);
        assert!(rooms.contains(&Room::Role(UserRole::Customer)));
        assert!(!rooms.iter().any(|r| matches!(r, Room::Vendor(_))));
    }

    #[test]
    fn test_location_room_joined_when_present() {
        let user = User::new("s@hub.test", "Staff", UserRole::Staff)
            .with_location("warehouse-7");
        let snapshot = PreferenceSnapshot::merge(&user.preferences, None);

        let rooms = rooms_for(&user, None, &snapshot);
        assert!(rooms.contains(&Room::Location("warehouse-7".to_string())));
    }

    #[test]
    fn test_vendor_settings_suppress_preference_rooms() {
        let (user, mut vendor) = vendor_user();
        vendor.settings = VendorNotificationSettings {
            low_stock_alerts: false,
            order_alerts: false,
            ..Default::default()
        };
        let snapshot = PreferenceSnapshot::merge(&user.preferences, Some(&vendor.settings));

        let rooms = rooms_for(&user, Some(&vendor), &snapshot);
        assert!(!rooms.contains(&Room::Preference(PreferenceKind::LowStock)));
        assert!(!rooms.contains(&Room::Preference(PreferenceKind::NewOrders)));
        assert!(rooms.contains(&Room::Preference(PreferenceKind::SystemUpdates)));
    }
}
