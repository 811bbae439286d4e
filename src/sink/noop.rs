//! No-op sinks, used when `--logdir`/`--statedir` are not configured.

use async_trait::async_trait;

use super::{LogRecord, LogSink, StateRecord, StateSink};
use crate::error::SinkError;

pub struct NoopLogSink;

#[async_trait]
impl LogSink for NoopLogSink {
    async fn log(&self, _record: LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

pub struct NoopStateSink;

#[async_trait]
impl StateSink for NoopStateSink {
    async fn save(&self, _record: StateRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
