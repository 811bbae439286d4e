//! Log and state sinks.
//!
//! Channel actors hand structural events (join, part, topic, mode) and user
//! content to a [`LogSink`], and topic/key changes to a [`StateSink`].
//! Delivery is best-effort: callers log sink failures and move on, so a slow
//! or broken sink can never wedge an actor loop.

mod fs;
mod noop;

pub use fs::{load_state, FsLogSink, FsStateSink};
pub use noop::{NoopLogSink, NoopStateSink};

use async_trait::async_trait;

use crate::error::SinkError;

/// One channel-log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub channel: String,
    pub nickname: String,
    pub text: String,
    /// `true` for structural events (join, part, topic, mode),
    /// `false` for user content.
    pub meta: bool,
}

/// A channel's persistent topic/key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    pub channel: String,
    pub topic: String,
    pub key: String,
}

/// Receiver for channel log entries.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn log(&self, record: LogRecord) -> Result<(), SinkError>;
}

/// Receiver for channel topic/key snapshots.
#[async_trait]
pub trait StateSink: Send + Sync {
    async fn save(&self, record: StateRecord) -> Result<(), SinkError>;
}
