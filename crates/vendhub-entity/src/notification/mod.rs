//! Notification entity: model, kind/category/priority enums, and the
//! embedded per-channel delivery record.

pub mod category;
pub mod delivery;
pub mod kind;
pub mod model;
pub mod priority;

pub use category::NotificationCategory;
pub use delivery::{ChannelAttempt, DeliveryRecord};
pub use kind::NotificationKind;
pub use model::Notification;
pub use priority::NotificationPriority;
