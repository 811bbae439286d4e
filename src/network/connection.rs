//! Per-connection tasks.
//!
//! Each accepted socket gets one connection task (the reader) plus one writer
//! task:
//!
//! ```text
//! socket ──▶ FramedRead ──▶ daemon inbox (New / Line / Del)
//! outbound queue ──▶ writer task ──▶ FramedWrite ──▶ socket
//! ```
//!
//! The reader announces the client with `New`, forwards every complete line,
//! and emits exactly one `Del` when the connection ends for any reason: EOF,
//! read error, framing overflow, or a cancellation triggered by the daemon
//! (QUIT, ping timeout, failed registration). The writer drains the bounded
//! outbound queue; on cancellation it flushes what is already queued so a
//! final numeric reaches the peer before the socket closes.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::network::codec::LineCodec;
use crate::proto::Message;
use crate::state::{DaemonEvent, DaemonHandle, Peer};

/// One client connection.
pub struct Connection<S> {
    peer: Arc<Peer>,
    outbound: mpsc::Receiver<Message>,
    daemon: DaemonHandle,
    stream: S,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    pub fn new(
        peer: Arc<Peer>,
        outbound: mpsc::Receiver<Message>,
        daemon: DaemonHandle,
        stream: S,
    ) -> Self {
        Self {
            peer,
            outbound,
            daemon,
            stream,
        }
    }

    /// Drive the connection until it ends. Consumes the task.
    pub async fn run(self) {
        let Self {
            peer,
            outbound,
            daemon,
            stream,
        } = self;

        if daemon
            .send(DaemonEvent::New {
                peer: Arc::clone(&peer),
            })
            .await
            .is_err()
        {
            return;
        }

        let (read_half, write_half) = tokio::io::split(stream);
        let mut lines = tokio_util::codec::FramedRead::new(read_half, LineCodec);

        // --- writer task ---
        let writer_peer = Arc::clone(&peer);
        let writer = tokio::spawn(async move {
            let mut sink = tokio_util::codec::FramedWrite::new(write_half, LineCodec);
            let mut rx = outbound;
            loop {
                tokio::select! {
                    biased;
                    _ = writer_peer.cancellation().cancelled() => {
                        // Flush whatever is already queued, then stop.
                        while let Ok(msg) = rx.try_recv() {
                            if sink.send(msg).await.is_err() {
                                break;
                            }
                        }
                        break;
                    }
                    maybe = rx.recv() => match maybe {
                        Some(msg) => {
                            if let Err(e) = sink.send(msg).await {
                                debug!(addr = %writer_peer.addr, error = %e, "write failed");
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        // --- reader loop ---
        loop {
            tokio::select! {
                _ = peer.cancellation().cancelled() => break,
                item = lines.next() => match item {
                    Some(Ok(line)) => {
                        if daemon
                            .send(DaemonEvent::Line { id: peer.id, line })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(addr = %peer.addr, error = %e, "read failed");
                        break;
                    }
                    None => break,
                },
            }
        }

        let _ = daemon.send(DaemonEvent::Del { id: peer.id }).await;
        peer.close();
        let _ = writer.await;
        debug!(addr = %peer.addr, "connection closed");
    }
}
