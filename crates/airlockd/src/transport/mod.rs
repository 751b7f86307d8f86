//! Socket transport: listener, client streams, and the slot table.

mod connection;
mod errors;
mod listener;

pub use connection::{ClientStream, ConnectionTable, ReadOutcome};
pub use errors::ListenerError;
pub use listener::GatewayListener;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
