//! Server state: the daemon actor, channel actors, and client handles.

pub mod channel;
pub mod client;
pub mod daemon;

pub use channel::{ChannelEvent, ChannelInfo};
pub use client::{ClientId, Member, Peer};
pub use daemon::{Daemon, DaemonEvent, DaemonHandle};
