//! # vendhub-entity
//!
//! Domain entity models for the VendHub marketplace back-office. Every
//! struct in this crate represents a document-store record or a domain
//! value object. All entities derive `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod notification;
pub mod user;
pub mod vendor;
