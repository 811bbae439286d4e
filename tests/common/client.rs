//! Raw-line test IRC client.

#![allow(dead_code)]

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    nick: String,
}

impl TestClient {
    pub async fn connect(address: &str, nick: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            nick: nick.to_string(),
        })
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Send one line; CRLF is appended.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send raw bytes without any terminator.
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one line within the default window.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        anyhow::ensure!(n > 0, "connection closed");
        Ok(line.trim_end().to_string())
    }

    /// Receive lines until one contains `needle`; returns everything read
    /// including the matching line.
    pub async fn recv_until(&mut self, needle: &str) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = line.contains(needle);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Read whatever arrives within `dur`.
    pub async fn drain_for(&mut self, dur: Duration) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.recv_timeout(dur).await {
            lines.push(line);
        }
        lines
    }

    /// Register with NICK/USER and wait for the welcome burst to finish
    /// (terminated by 422, since tests run without a MOTD unless stated).
    pub async fn register(&mut self) -> anyhow::Result<()> {
        let nick = self.nick.clone();
        self.send(&format!("NICK {}", nick)).await?;
        self.send(&format!("USER {} 0 * :{} Example", nick, nick))
            .await?;
        self.recv_until(" 422 ").await?;
        Ok(())
    }

    /// JOIN a channel and wait for the end of the NAMES burst.
    pub async fn join(&mut self, channel: &str) -> anyhow::Result<Vec<String>> {
        self.send(&format!("JOIN {}", channel)).await?;
        self.recv_until(" 366 ").await
    }

    /// Assert that the server closes the connection within `dur`.
    pub async fn expect_close(&mut self, dur: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + dur;
        loop {
            let remaining = deadline
                .checked_duration_since(tokio::time::Instant::now())
                .ok_or_else(|| anyhow::anyhow!("connection still open"))?;
            let mut line = String::new();
            match timeout(remaining, self.reader.read_line(&mut line)).await {
                Ok(Ok(0)) => return Ok(()),
                Ok(Ok(_)) => continue,
                Ok(Err(_)) => return Ok(()),
                Err(_) => anyhow::bail!("connection still open"),
            }
        }
    }
}
