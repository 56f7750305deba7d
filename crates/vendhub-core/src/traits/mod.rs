//! Collaborator traits the notification platform is built against.
//!
//! The email transport and the real-time socket layer are external
//! collaborators; the orchestrator only depends on these interfaces,
//! which are implemented by the server wiring and by test doubles.

pub mod email;
pub mod transport;

pub use email::EmailSender;
pub use transport::RoomTransport;
