//! # vendhub-core
//!
//! Core crate for the VendHub marketplace back-office. Contains the
//! unified error system, typed identifiers, configuration schemas,
//! domain events, and the collaborator traits (email sender, real-time
//! transport) the notification platform is built against.
//!
//! This crate has **no** internal dependencies on other VendHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
