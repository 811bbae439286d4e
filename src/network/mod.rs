//! Network layer: listener, per-connection tasks, and line framing.

pub mod codec;
mod connection;
mod gateway;

pub use connection::Connection;
pub use gateway::Gateway;
