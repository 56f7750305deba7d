//! User entity: model, role, and notification preferences.

pub mod model;
pub mod preference;
pub mod role;

pub use model::User;
pub use preference::{NotificationPreferences, PreferenceKind, PreferenceSnapshot};
pub use role::UserRole;
