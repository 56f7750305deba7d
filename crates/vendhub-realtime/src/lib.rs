//! # vendhub-realtime
//!
//! Connection registry for the VendHub notification platform. Provides:
//!
//! - Connection handles and a pool indexed by user
//! - Room registry with deterministic room assignment per connection
//! - Heartbeat-based staleness sweeps and error-threshold disconnects
//! - Periodic reconciliation against the transport's live connection set
//! - A local in-process implementation of the `RoomTransport` trait

pub mod connection;
pub mod message;
pub mod registry;
pub mod rooms;
pub mod sweeper;
pub mod transport;

pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use connection::pool::ConnectionPool;
pub use message::OutboundMessage;
pub use registry::ConnectionRegistry;
pub use rooms::name::Room;
pub use rooms::registry::RoomRegistry;
pub use transport::LocalTransport;
