//! In-memory store implementations.
//!
//! Backed by `DashMap`; used as the reference store for a single-process
//! deployment and as the backing store for tests.

pub mod notifications;
pub mod users;
pub mod vendors;

pub use notifications::MemoryNotificationStore;
pub use users::MemoryUserDirectory;
pub use vendors::MemoryVendorDirectory;
