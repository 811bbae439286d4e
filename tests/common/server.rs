//! In-process test server.
//!
//! Assembles sinks, daemon, and gateway from a [`Config`] the same way the
//! binary does, bound to an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use tinyircd::config::Config;
use tinyircd::network::Gateway;
use tinyircd::sink::{self, FsLogSink, FsStateSink, LogSink, NoopLogSink, NoopStateSink, StateSink};
use tinyircd::state::{Daemon, DaemonHandle};

use super::client::TestClient;

pub struct TestServer {
    addr: SocketAddr,
    handle: DaemonHandle,
    gateway_task: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    /// Spawn with defaults: ephemeral port, no sinks, production timers.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(Config::default()).await
    }

    /// Spawn from an explicit config. `bind` should use port 0; log and
    /// state directories are honored just like in the binary.
    pub async fn spawn_with(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let log_sink: Arc<dyn LogSink> = match &config.logdir {
            Some(dir) => Arc::new(FsLogSink::new(dir.clone())),
            None => Arc::new(NoopLogSink),
        };
        let state_sink: Arc<dyn StateSink> = match &config.statedir {
            Some(dir) => Arc::new(FsStateSink::new(dir.clone())),
            None => Arc::new(NoopStateSink),
        };

        let mut daemon = Daemon::new(Arc::clone(&config), log_sink, state_sink);
        if let Some(dir) = &config.statedir {
            for record in sink::load_state(dir).await? {
                daemon.register_channel(&record.channel, record.topic, record.key, false);
            }
        }

        let handle = daemon.spawn();
        let gateway = Gateway::bind(&config, handle.clone()).await?;
        let addr = gateway.local_addr()?;
        let gateway_task = tokio::spawn(gateway.run());

        Ok(Self {
            addr,
            handle,
            gateway_task,
        })
    }

    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Connect a raw client (no registration performed).
    pub async fn connect(&self, nick: &str) -> anyhow::Result<TestClient> {
        TestClient::connect(&self.address(), nick).await
    }

    /// Connect and complete NICK/USER registration.
    pub async fn connect_registered(&self, nick: &str) -> anyhow::Result<TestClient> {
        let mut client = self.connect(nick).await?;
        client.register().await?;
        Ok(client)
    }

    /// Gracefully stop the daemon and the accept loop.
    pub async fn shutdown(self) {
        self.handle.shutdown().await;
        self.gateway_task.abort();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.gateway_task.abort();
    }
}
