//! tinyircd - a minimalistic IRC server.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tinyircd::config::Args;
use tinyircd::network::Gateway;
use tinyircd::sink::{self, FsLogSink, FsStateSink, LogSink, NoopLogSink, NoopStateSink, StateSink};
use tinyircd::state::Daemon;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(true)
        .init();

    let config = Arc::new(args.into_config()?);
    info!(hostname = %config.hostname, bind = %config.bind, "starting tinyircd");

    let log_sink: Arc<dyn LogSink> = match &config.logdir {
        Some(dir) => {
            info!(dir = %dir.display(), "channel logger initialized");
            Arc::new(FsLogSink::new(dir.clone()))
        }
        None => Arc::new(NoopLogSink),
    };
    let state_sink: Arc<dyn StateSink> = match &config.statedir {
        Some(dir) => {
            info!(dir = %dir.display(), "statekeeper initialized");
            Arc::new(FsStateSink::new(dir.clone()))
        }
        None => Arc::new(NoopStateSink),
    };

    let mut daemon = Daemon::new(Arc::clone(&config), log_sink, state_sink);

    // Replay persisted channel state before accepting connections.
    if let Some(dir) = &config.statedir {
        for record in sink::load_state(dir).await? {
            info!(channel = %record.channel, "loaded channel state");
            daemon.register_channel(&record.channel, record.topic, record.key, false);
        }
    }

    let handle = daemon.spawn();
    let gateway = Gateway::bind(&config, handle.clone()).await?;

    tokio::select! {
        result = gateway.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            handle.shutdown().await;
        }
    }
    Ok(())
}
