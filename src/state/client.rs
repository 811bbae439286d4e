//! Per-connection handles shared between the daemon and channel actors.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::proto::{Message, Prefix};

/// Stable identifier for one connection, allocated by the gateway.
pub type ClientId = u64;

/// Capacity of a client's outbound queue. A peer that falls this far behind
/// starts losing lines (see [`Peer::send`]).
pub const OUTBOUND_QUEUE: usize = 256;

/// Handle to one connected peer: its outbound queue and its kill switch.
///
/// The reader, the daemon, and every channel actor the client is in all hold
/// clones of the same `Arc<Peer>`. Writes go through the bounded queue to a
/// dedicated writer task, so no lock is needed to serialize them.
#[derive(Debug)]
pub struct Peer {
    pub id: ClientId,
    /// Remote address as reported by the listener, `ip:port`.
    pub addr: String,
    outbound: mpsc::Sender<Message>,
    cancel: CancellationToken,
}

impl Peer {
    /// Create a peer handle and the receiving end of its outbound queue.
    pub fn new(id: ClientId, addr: String) -> (Arc<Self>, mpsc::Receiver<Message>) {
        let (outbound, rx) = mpsc::channel(OUTBOUND_QUEUE);
        let peer = Arc::new(Self {
            id,
            addr,
            outbound,
            cancel: CancellationToken::new(),
        });
        (peer, rx)
    }

    /// Queue a line for this peer. Never blocks: a full queue drops the line
    /// (slow consumer), a closed queue means the connection is going away.
    pub fn send(&self, msg: Message) {
        match self.outbound.try_send(msg) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(msg)) => {
                warn!(id = self.id, addr = %self.addr, line = %msg, "outbound queue full, dropping line");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(id = self.id, addr = %self.addr, "send to closed connection");
            }
        }
    }

    /// Force-close the connection. The reader observes the cancellation,
    /// emits its leave event, and the connection tears down.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// The cancellation token the connection tasks select on.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The host portion of the remote address (without the port).
    pub fn host(&self) -> &str {
        self.addr.rsplit_once(':').map_or(self.addr.as_str(), |(host, _)| host)
    }
}

/// Identity snapshot of a registered client, stored by channel actors and
/// carried inside channel events for reply addressing. Identity is frozen at
/// registration (NICK is not accepted afterwards), so snapshots do not go
/// stale.
#[derive(Debug, Clone)]
pub struct Member {
    pub peer: Arc<Peer>,
    pub nick: String,
    pub user: String,
    pub realname: String,
}

impl Member {
    /// The `nick!user@addr` display form used as a message prefix.
    pub fn prefix(&self) -> Prefix {
        Prefix::User {
            nick: self.nick.clone(),
            user: self.user.clone(),
            host: self.peer.addr.clone(),
        }
    }
}

/// Liveness tracking for one client, held by the daemon.
#[derive(Debug)]
pub struct Aliveness {
    pub last_seen: std::time::Instant,
    pub ping_sent: bool,
}

impl Aliveness {
    pub fn fresh() -> Self {
        Self {
            last_seen: std::time::Instant::now(),
            ping_sent: false,
        }
    }

    /// Record inbound activity.
    pub fn touch(&mut self) {
        self.last_seen = std::time::Instant::now();
        self.ping_sent = false;
    }
}
