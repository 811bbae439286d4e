//! The channel actor.
//!
//! One task per channel. The actor owns the channel's topic, key, and
//! membership set; every mutation and broadcast flows through its inbox, so
//! processing order is the delivery order every member observes. Join and
//! part admission results travel back to the daemon over a oneshot carried in
//! the event; everything else is fire-and-forget.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::proto::{Message, Response};
use crate::sink::{LogRecord, LogSink, StateRecord, StateSink};
use crate::state::client::{ClientId, Member};

/// Capacity of a channel actor's inbox.
const INBOX: usize = 64;

/// Events a channel actor consumes.
pub enum ChannelEvent {
    /// A client joining. `key` is the key supplied on JOIN, checked against
    /// the channel key; the result is reported over `reply`.
    Join {
        member: Member,
        key: Option<String>,
        reply: oneshot::Sender<Result<(), ChannelError>>,
    },
    /// A client parting. `Err(NotOnChannel)` is reported over `reply` if the
    /// client is not a member.
    Part {
        id: ClientId,
        reply: oneshot::Sender<Result<(), ChannelError>>,
    },
    /// A client disconnected; remove silently if present.
    Quit { id: ClientId },
    /// TOPIC query (empty text) or change.
    Topic { member: Member, text: String },
    /// WHO listing, answered directly to the requester.
    Who { member: Member },
    /// MODE query or key change. `args` is everything after the channel name.
    Mode { member: Member, args: String },
    /// PRIVMSG/NOTICE to the channel.
    Privmsg {
        member: Member,
        notice: bool,
        text: String,
    },
    /// Snapshot for LIST.
    Info { reply: oneshot::Sender<ChannelInfo> },
    /// Graceful shutdown.
    Term,
}

/// Point-in-time channel snapshot for LIST.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub name: String,
    pub topic: String,
    pub member_count: usize,
}

/// Construction parameters for a channel actor.
pub struct ChannelParams {
    pub name: String,
    pub topic: String,
    pub key: String,
    pub hostname: String,
    pub log_sink: Arc<dyn LogSink>,
    pub state_sink: Arc<dyn StateSink>,
}

/// The channel actor. Owns topic, key, and membership exclusively.
pub struct ChannelActor {
    name: String,
    topic: String,
    key: String,
    hostname: String,
    members: BTreeMap<ClientId, Member>,
    log_sink: Arc<dyn LogSink>,
    state_sink: Arc<dyn StateSink>,
}

impl ChannelActor {
    /// Spawn the actor's event loop. When `persist_initial` is set (a channel
    /// created by JOIN with a key), the initial state is saved immediately so
    /// a restart reproduces it.
    pub fn spawn(params: ChannelParams, persist_initial: bool) -> mpsc::Sender<ChannelEvent> {
        let (tx, rx) = mpsc::channel(INBOX);
        let actor = Self {
            name: params.name,
            topic: params.topic,
            key: params.key,
            hostname: params.hostname,
            members: BTreeMap::new(),
            log_sink: params.log_sink,
            state_sink: params.state_sink,
        };
        tokio::spawn(async move {
            actor.run(rx, persist_initial).await;
        });
        tx
    }

    async fn run(mut self, mut rx: mpsc::Receiver<ChannelEvent>, persist_initial: bool) {
        if persist_initial {
            self.save_state().await;
        }
        while let Some(event) = rx.recv().await {
            match event {
                ChannelEvent::Join { member, key, reply } => {
                    let _ = reply.send(self.handle_join(member, key).await);
                }
                ChannelEvent::Part { id, reply } => {
                    let _ = reply.send(self.handle_part(id).await);
                }
                ChannelEvent::Quit { id } => self.handle_quit(id).await,
                ChannelEvent::Topic { member, text } => self.handle_topic(member, text).await,
                ChannelEvent::Who { member } => self.handle_who(member),
                ChannelEvent::Mode { member, args } => self.handle_mode(member, args).await,
                ChannelEvent::Privmsg {
                    member,
                    notice,
                    text,
                } => self.handle_privmsg(member, notice, text).await,
                ChannelEvent::Info { reply } => {
                    let _ = reply.send(ChannelInfo {
                        name: self.name.clone(),
                        topic: self.topic.clone(),
                        member_count: self.members.len(),
                    });
                }
                ChannelEvent::Term => break,
            }
        }
        debug!(channel = %self.name, "channel actor stopped");
    }

    async fn handle_join(&mut self, member: Member, key: Option<String>) -> Result<(), ChannelError> {
        if !self.key.is_empty() && key.as_deref() != Some(self.key.as_str()) {
            return Err(ChannelError::BadChannelKey);
        }

        self.send_topic(&member);

        let newcomer = member.clone();
        self.members.insert(member.peer.id, member);

        let join = Message::from_user(
            newcomer.prefix(),
            "JOIN",
            vec![self.name.clone()],
            None,
        );
        self.broadcast(join, None);

        let names = self.sorted_nicks().join(" ");
        self.numeric(
            &newcomer,
            Response::RPL_NAMREPLY,
            vec!["=".into(), self.name.clone()],
            names,
        );
        self.numeric(
            &newcomer,
            Response::RPL_ENDOFNAMES,
            vec![self.name.clone()],
            "End of NAMES list".into(),
        );

        self.log(&newcomer.nick, "joined", true).await;
        Ok(())
    }

    async fn handle_part(&mut self, id: ClientId) -> Result<(), ChannelError> {
        let Some(member) = self.members.remove(&id) else {
            return Err(ChannelError::NotOnChannel);
        };
        let part = Message::from_user(
            member.prefix(),
            "PART",
            vec![self.name.clone()],
            Some(member.nick.clone()),
        );
        self.broadcast(part, None);
        self.log(&member.nick, "left", true).await;
        Ok(())
    }

    async fn handle_quit(&mut self, id: ClientId) {
        if let Some(member) = self.members.remove(&id) {
            let part = Message::from_user(
                member.prefix(),
                "PART",
                vec![self.name.clone()],
                Some(member.nick.clone()),
            );
            self.broadcast(part, None);
            self.log(&member.nick, "left", true).await;
        }
    }

    async fn handle_topic(&mut self, member: Member, text: String) {
        if !self.members.contains_key(&member.peer.id) {
            member
                .peer
                .send(ChannelError::NotOnChannel.to_reply(&self.hostname, &member.nick, &self.name));
            return;
        }
        if text.is_empty() {
            self.send_topic(&member);
            return;
        }
        self.topic = text.strip_prefix(':').unwrap_or(&text).to_string();
        let broadcast = Message::from_user(
            member.prefix(),
            "TOPIC",
            vec![self.name.clone()],
            Some(self.topic.clone()),
        );
        self.broadcast(broadcast, None);
        self.log(&member.nick, &format!("set topic to {}", self.topic), true)
            .await;
        self.save_state().await;
    }

    fn handle_who(&self, requester: Member) {
        for member in self.members.values() {
            self.numeric(
                &requester,
                Response::RPL_WHOREPLY,
                vec![
                    self.name.clone(),
                    member.user.clone(),
                    member.peer.addr.clone(),
                    self.hostname.clone(),
                    member.nick.clone(),
                    "H".into(),
                ],
                format!("0 {}", member.realname),
            );
        }
        self.numeric(
            &requester,
            Response::RPL_ENDOFWHO,
            vec![self.name.clone()],
            "End of /WHO list".into(),
        );
    }

    async fn handle_mode(&mut self, member: Member, args: String) {
        if args.is_empty() {
            let mode = if self.key.is_empty() { "+" } else { "+k" };
            member.peer.send(Message::reply(
                &self.hostname,
                Response::RPL_CHANNELMODEIS,
                vec![member.nick.clone(), self.name.clone(), mode.into()],
                None,
            ));
            return;
        }
        if args.starts_with('b') {
            self.numeric(
                &member,
                Response::RPL_ENDOFBANLIST,
                vec![self.name.clone()],
                "End of channel ban list".into(),
            );
            return;
        }
        if !args.starts_with("+k") && !args.starts_with("-k") {
            let flag = args.split_whitespace().next().unwrap_or(&args);
            self.numeric(
                &member,
                Response::ERR_UNKNOWNMODE,
                vec![flag.to_string()],
                "Unknown MODE flag".into(),
            );
            return;
        }
        if !self.members.contains_key(&member.peer.id) {
            member
                .peer
                .send(ChannelError::NotOnChannel.to_reply(&self.hostname, &member.nick, &self.name));
            return;
        }

        let (broadcast, log_text) = if let Some(rest) = args.strip_prefix("+k") {
            let Some(key) = rest.split_whitespace().next() else {
                self.numeric(
                    &member,
                    Response::ERR_NEEDMOREPARAMS,
                    vec!["MODE".into()],
                    "Not enough parameters".into(),
                );
                return;
            };
            self.key = key.to_string();
            (
                Message::from_user(
                    member.prefix(),
                    "MODE",
                    vec![self.name.clone(), "+k".into(), self.key.clone()],
                    None,
                ),
                format!("set channel key to {}", self.key),
            )
        } else {
            self.key.clear();
            (
                Message::from_user(
                    member.prefix(),
                    "MODE",
                    vec![self.name.clone(), "-k".into()],
                    None,
                ),
                "removed channel key".to_string(),
            )
        };
        self.broadcast(broadcast, None);
        self.log(&member.nick, &log_text, true).await;
        self.save_state().await;
    }

    async fn handle_privmsg(&mut self, member: Member, notice: bool, text: String) {
        let verb = if notice { "NOTICE" } else { "PRIVMSG" };
        let msg = Message::from_user(
            member.prefix(),
            verb,
            vec![self.name.clone()],
            Some(text.clone()),
        );
        self.broadcast(msg, Some(member.peer.id));
        self.log(&member.nick, &text, false).await;
    }

    /// Send the current topic (or its absence) to one client.
    fn send_topic(&self, member: &Member) {
        if self.topic.is_empty() {
            self.numeric(
                member,
                Response::RPL_NOTOPIC,
                vec![self.name.clone()],
                "No topic is set".into(),
            );
        } else {
            self.numeric(
                member,
                Response::RPL_TOPIC,
                vec![self.name.clone()],
                self.topic.clone(),
            );
        }
    }

    /// Queue a line to every member, optionally excluding one.
    fn broadcast(&self, msg: Message, exclude: Option<ClientId>) {
        for member in self.members.values() {
            if exclude == Some(member.peer.id) {
                continue;
            }
            member.peer.send(msg.clone());
        }
    }

    /// Numeric reply addressed to `member`'s nickname with a trailing text.
    fn numeric(&self, member: &Member, code: Response, params: Vec<String>, trailing: String) {
        let mut full = vec![member.nick.clone()];
        full.extend(params);
        member
            .peer
            .send(Message::reply(&self.hostname, code, full, Some(trailing)));
    }

    fn sorted_nicks(&self) -> Vec<String> {
        let mut nicks: Vec<String> = self.members.values().map(|m| m.nick.clone()).collect();
        nicks.sort();
        nicks
    }

    async fn log(&self, nickname: &str, text: &str, meta: bool) {
        let record = LogRecord {
            channel: self.name.clone(),
            nickname: nickname.to_string(),
            text: text.to_string(),
            meta,
        };
        if let Err(e) = self.log_sink.log(record).await {
            warn!(channel = %self.name, error = %e, "log sink failed");
        }
    }

    async fn save_state(&self) {
        let record = StateRecord {
            channel: self.name.clone(),
            topic: self.topic.clone(),
            key: self.key.clone(),
        };
        if let Err(e) = self.state_sink.save(record).await {
            warn!(channel = %self.name, error = %e, "state sink failed");
        }
    }
}
