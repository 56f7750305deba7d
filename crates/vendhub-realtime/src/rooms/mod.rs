//! Room naming, membership registry, and per-connection assignment.

pub mod assignment;
pub mod name;
pub mod registry;

pub use assignment::rooms_for;
pub use name::Room;
pub use registry::RoomRegistry;
