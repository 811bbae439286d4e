//! tinyircd - a minimalistic IRC server.
//!
//! A subset of RFC 1459/2812 large enough for real clients: registration,
//! channels with topics and `+k` keys, PRIVMSG/NOTICE, presence queries, and
//! PING-based liveness. One actor task per channel owns that channel's state;
//! a singleton daemon actor owns the client registry and routes every
//! command.

pub mod config;
pub mod error;
pub mod network;
pub mod proto;
pub mod sink;
pub mod state;

pub use config::Config;
pub use network::Gateway;
pub use state::{Daemon, DaemonHandle};
