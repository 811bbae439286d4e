//! Filesystem-backed sinks.
//!
//! Log entries append to one file per channel under the log directory.
//! Channel state is written as a file named after the channel (including the
//! `#`) containing two lines: the topic, then the key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use super::{LogRecord, LogSink, StateRecord, StateSink};
use crate::error::SinkError;

/// Appends channel logs under a directory, one file per channel.
pub struct FsLogSink {
    dir: PathBuf,
}

impl FsLogSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl LogSink for FsLogSink {
    async fn log(&self, record: LogRecord) -> Result<(), SinkError> {
        let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let line = if record.meta {
            format!("[{}] {} {}\n", stamp, record.nickname, record.text)
        } else {
            format!("[{}] <{}> {}\n", stamp, record.nickname, record.text)
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(&record.channel))
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

/// Writes one state file per channel under a directory.
pub struct FsStateSink {
    dir: PathBuf,
}

impl FsStateSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl StateSink for FsStateSink {
    async fn save(&self, record: StateRecord) -> Result<(), SinkError> {
        let contents = format!("{}\n{}\n", record.topic, record.key);
        tokio::fs::write(self.dir.join(&record.channel), contents).await?;
        Ok(())
    }
}

/// Load all persisted channel states from a state directory.
///
/// Files whose names do not start with `#` are ignored. Corrupt files (fewer
/// than two lines) are reported and skipped.
pub async fn load_state(dir: &Path) -> Result<Vec<StateRecord>, SinkError> {
    let mut records = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('#') {
            continue;
        }
        let contents = tokio::fs::read_to_string(entry.path()).await?;
        let mut lines = contents.split('\n');
        match (lines.next(), lines.next()) {
            (Some(topic), Some(key)) => records.push(StateRecord {
                channel: name,
                topic: topic.to_string(),
                key: key.to_string(),
            }),
            _ => warn!(channel = %name, "state file corrupted, skipping"),
        }
    }
    records.sort_by(|a, b| a.channel.cmp(&b.channel));
    Ok(records)
}
