//! Configuration: CLI surface and runtime settings.
//!
//! The CLI flags parse into [`Args`]; [`Args::into_config`] validates them
//! into the [`Config`] the server components consume. Tests construct a
//! [`Config`] directly (with shrunk liveness timers) instead of going
//! through the CLI.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "tinyircd", version, about = "A minimalistic IRC server")]
pub struct Args {
    /// Server name used in reply prefixes
    #[arg(long, default_value = "localhost")]
    pub hostname: String,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:6667")]
    pub bind: SocketAddr,

    /// Path to the MOTD file
    #[arg(long)]
    pub motd: Option<PathBuf>,

    /// Absolute path to the channel log directory
    #[arg(long)]
    pub logdir: Option<PathBuf>,

    /// Absolute path to the channel state directory
    #[arg(long)]
    pub statedir: Option<PathBuf>,

    /// Path to the `nickname:password` file
    #[arg(long)]
    pub passwords: Option<PathBuf>,

    /// TLS private key file (requires --tls-cert)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,

    /// TLS certificate file (requires --tls-key)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Validate the arguments into a runtime [`Config`].
    pub fn into_config(self) -> anyhow::Result<Config> {
        if let Some(dir) = &self.logdir {
            anyhow::ensure!(dir.is_absolute(), "logdir must be an absolute path");
        }
        if let Some(dir) = &self.statedir {
            anyhow::ensure!(dir.is_absolute(), "statedir must be an absolute path");
        }
        let tls = match (self.tls_key, self.tls_cert) {
            (Some(key), Some(cert)) => Some(TlsConfig { key, cert }),
            (None, None) => None,
            _ => anyhow::bail!("--tls-key and --tls-cert must be given together"),
        };
        Ok(Config {
            hostname: self.hostname,
            bind: self.bind,
            motd: self.motd,
            logdir: self.logdir,
            statedir: self.statedir,
            passwords: self.passwords,
            tls,
            verbose: self.verbose,
            timeouts: TimeoutsConfig::default(),
        })
    }
}

/// TLS listener configuration.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub key: PathBuf,
    pub cert: PathBuf,
}

/// Liveness timing knobs.
#[derive(Debug, Clone)]
pub struct TimeoutsConfig {
    /// Idle time before a PING probe is sent to a registered client.
    pub ping_threshold: Duration,
    /// Idle time before the connection is forcibly closed.
    pub ping_timeout: Duration,
    /// Period of the aliveness sweep.
    pub check_interval: Duration,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            ping_threshold: Duration::from_secs(90),
            ping_timeout: Duration::from_secs(180),
            check_interval: Duration::from_secs(10),
        }
    }
}

/// Runtime server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub hostname: String,
    pub bind: SocketAddr,
    pub motd: Option<PathBuf>,
    pub logdir: Option<PathBuf>,
    pub statedir: Option<PathBuf>,
    pub passwords: Option<PathBuf>,
    pub tls: Option<TlsConfig>,
    pub verbose: bool,
    pub timeouts: TimeoutsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: "localhost".into(),
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            motd: None,
            logdir: None,
            statedir: None,
            passwords: None,
            tls: None,
            verbose: false,
            timeouts: TimeoutsConfig::default(),
        }
    }
}
