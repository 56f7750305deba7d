//! # vendhub-store
//!
//! Store access for the VendHub notification platform. The document
//! store itself is an external collaborator; this crate defines the
//! exact query surface the orchestrator relies on (`NotificationStore`,
//! `UserDirectory`, `VendorDirectory`) plus in-memory reference
//! implementations used by the server binary and by tests.

pub mod memory;
pub mod traits;

pub use memory::{MemoryNotificationStore, MemoryUserDirectory, MemoryVendorDirectory};
pub use traits::{NotificationStore, UserDirectory, VendorDirectory};
