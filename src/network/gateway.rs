//! The TCP (and optional TLS) listener.
//!
//! Accepts connections, allocates client ids, and spawns one
//! [`Connection`] task per socket. TLS handshakes run inside the spawned
//! task so a stalled handshake never blocks the accept loop.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_rustls::rustls::pki_types::PrivateKeyDer;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;
use tracing::{error, info, warn};

use crate::config::{Config, TlsConfig};
use crate::network::Connection;
use crate::state::{DaemonHandle, Peer};

pub struct Gateway {
    listener: TcpListener,
    tls: Option<TlsAcceptor>,
    daemon: DaemonHandle,
}

impl Gateway {
    /// Bind the listen address and, if configured, load the TLS identity.
    pub async fn bind(config: &Config, daemon: DaemonHandle) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.bind).await?;
        let tls = match &config.tls {
            Some(tls_config) => Some(load_tls_acceptor(tls_config).await?),
            None => None,
        };
        info!(addr = %listener.local_addr()?, tls = tls.is_some(), "listening");
        Ok(Self {
            listener,
            tls,
            daemon,
        })
    }

    /// The bound address (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub async fn run(self) -> std::io::Result<()> {
        let mut next_id = 0u64;
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    next_id += 1;
                    let id = next_id;
                    let daemon = self.daemon.clone();
                    let tls = self.tls.clone();
                    tokio::spawn(async move {
                        let (peer, outbound) = Peer::new(id, addr.to_string());
                        match tls {
                            Some(acceptor) => match acceptor.accept(stream).await {
                                Ok(stream) => {
                                    Connection::new(peer, outbound, daemon, stream).run().await;
                                }
                                Err(e) => {
                                    warn!(%addr, error = %e, "TLS handshake failed");
                                }
                            },
                            None => {
                                Connection::new(peer, outbound, daemon, stream).run().await;
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Build a TLS acceptor from PEM cert and key files.
async fn load_tls_acceptor(config: &TlsConfig) -> anyhow::Result<TlsAcceptor> {
    let cert_data = tokio::fs::read(&config.cert).await?;
    let cert_chain: Vec<_> =
        rustls_pemfile::certs(&mut Cursor::new(&cert_data)).collect::<Result<_, _>>()?;
    anyhow::ensure!(!cert_chain.is_empty(), "no certificates in {}", config.cert.display());

    let key_data = tokio::fs::read(&config.key).await?;
    let key: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut Cursor::new(&key_data))?
        .ok_or_else(|| anyhow::anyhow!("no private key in {}", config.key.display()))?;

    let tls_config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, key)?;
    Ok(TlsAcceptor::from(Arc::new(tls_config)))
}
