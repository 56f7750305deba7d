//! Shared core value types.

pub mod id;
