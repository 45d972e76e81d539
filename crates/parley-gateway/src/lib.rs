//! # parley-gateway
//!
//! Delivery registry: maps authenticated live WebSocket connections to user
//! identity and fans domain events out to the connections of affected
//! participants. Delivery is best-effort; missed events remain retrievable
//! through the message listing on reconnect.

pub mod broadcast;
pub mod connection;
pub mod protocol;
pub mod server;

pub use broadcast::EventDispatcher;
pub use connection::{Connection, ConnectionRegistry};
pub use protocol::{ClientEvent, CloseCode};
pub use server::{gateway_router, GatewayState};
