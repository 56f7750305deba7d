//! Structured room names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use vendhub_core::AppError;
use vendhub_core::types::id::{UserId, VendorId};
use vendhub_entity::user::{PreferenceKind, UserRole};
use vendhub_entity::vendor::VendorStatus;

/// A broadcast room. Connections join rooms derived from the connected
/// user's identity, role, vendor attachment, and preferences; fan-out
/// emits target one room instead of enumerating recipients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Room {
    /// All connections of one user.
    User(UserId),
    /// All connections of users with a role.
    Role(UserRole),
    /// All connections attached to one vendor.
    Vendor(VendorId),
    /// All vendor-user connections whose vendor has a given status.
    VendorStatus(VendorStatus),
    /// All connections with a preference toggle enabled.
    Preference(PreferenceKind),
    /// All connections of users in a location.
    Location(String),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Role(role) => write!(f, "role:{role}"),
            Self::Vendor(id) => write!(f, "vendor:{id}"),
            Self::VendorStatus(status) => write!(f, "vendor-status:{status}"),
            Self::Preference(pref) => write!(f, "pref:{pref}"),
            Self::Location(loc) => write!(f, "location:{loc}"),
        }
    }
}

impl FromStr for Room {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s
            .split_once(':')
            .ok_or_else(|| AppError::validation(format!("Invalid room name: '{s}'")))?;
        match prefix {
            "user" => rest
                .parse::<UserId>()
                .map(Self::User)
                .map_err(|_| AppError::validation(format!("Invalid user room: '{s}'"))),
            "role" => rest.parse::<UserRole>().map(Self::Role),
            "vendor" => rest
                .parse::<VendorId>()
                .map(Self::Vendor)
                .map_err(|_| AppError::validation(format!("Invalid vendor room: '{s}'"))),
            "vendor-status" => rest.parse::<VendorStatus>().map(Self::VendorStatus),
            "pref" => match rest {
                "low-stock" => Ok(Self::Preference(PreferenceKind::LowStock)),
                "new-orders" => Ok(Self::Preference(PreferenceKind::NewOrders)),
                "system-updates" => Ok(Self::Preference(PreferenceKind::SystemUpdates)),
                _ => Err(AppError::validation(format!(
                    "Invalid preference room: '{s}'"
                ))),
            },
            "location" if !rest.is_empty() => Ok(Self::Location(rest.to_string())),
            _ => Err(AppError::validation(format!("Invalid room name: '{s}'"))),
        }
    }
}
