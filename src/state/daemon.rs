//! The daemon actor.
//!
//! A singleton task owning the client registry, the nickname index, the
//! channel index, and the liveness table. Connections feed it events through
//! a single inbox; everything that touches the registry happens inside this
//! actor, which is the serialization point for the global namespace.
//!
//! Per-channel commands are forwarded to the owning channel actor. Admission
//! results (join key check, part membership) come back over a oneshot so the
//! daemon can keep its per-client channel mirror accurate; the mirror feeds
//! WHOIS and the disconnect fan-out.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{HandlerError, HandlerResult};
use crate::proto::{is_valid_channel_name, is_valid_nick, Message, Prefix, Response};
use crate::sink::{LogSink, StateSink};
use crate::state::channel::{ChannelActor, ChannelEvent, ChannelParams};
use crate::state::client::{Aliveness, ClientId, Member, Peer};

/// Capacity of the daemon inbox.
const INBOX: usize = 1024;

/// Events delivered to the daemon.
pub enum DaemonEvent {
    /// A connection was accepted.
    New { peer: Arc<Peer> },
    /// A connection went away (EOF, error, overflow, or forced close).
    Del { id: ClientId },
    /// One complete command line from a client.
    Line { id: ClientId, line: String },
    /// Stop the daemon and terminate every channel actor.
    Shutdown,
}

/// Cloneable handle for submitting events to the daemon.
#[derive(Clone)]
pub struct DaemonHandle {
    tx: mpsc::Sender<DaemonEvent>,
}

impl DaemonHandle {
    /// Submit an event, waiting for inbox space. Fails only once the daemon
    /// has stopped.
    pub async fn send(
        &self,
        event: DaemonEvent,
    ) -> Result<(), mpsc::error::SendError<DaemonEvent>> {
        self.tx.send(event).await
    }

    /// Request a graceful stop: channel actors get `Term`, the daemon exits.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(DaemonEvent::Shutdown).await;
    }
}

/// One registry entry.
struct Client {
    peer: Arc<Peer>,
    nickname: String,
    username: String,
    realname: String,
    password: Option<String>,
    away: Option<String>,
    registered: bool,
    aliveness: Aliveness,
    /// Channels this client has joined, kept in sync from join/part results.
    channels: BTreeSet<String>,
}

impl Client {
    fn new(peer: Arc<Peer>) -> Self {
        Self {
            peer,
            nickname: "*".into(),
            username: String::new(),
            realname: String::new(),
            password: None,
            away: None,
            registered: false,
            aliveness: Aliveness::fresh(),
            channels: BTreeSet::new(),
        }
    }

    fn prefix(&self) -> Prefix {
        Prefix::User {
            nick: self.nickname.clone(),
            user: self.username.clone(),
            host: self.peer.addr.clone(),
        }
    }

    fn member(&self) -> Member {
        Member {
            peer: Arc::clone(&self.peer),
            nick: self.nickname.clone(),
            user: self.username.clone(),
            realname: self.realname.clone(),
        }
    }
}

/// The daemon actor state.
pub struct Daemon {
    config: Arc<Config>,
    clients: HashMap<ClientId, Client>,
    /// Lowercased nickname -> client, for uniqueness and target lookup.
    nicks: HashMap<String, ClientId>,
    channels: HashMap<String, mpsc::Sender<ChannelEvent>>,
    log_sink: Arc<dyn LogSink>,
    state_sink: Arc<dyn StateSink>,
}

impl Daemon {
    pub fn new(
        config: Arc<Config>,
        log_sink: Arc<dyn LogSink>,
        state_sink: Arc<dyn StateSink>,
    ) -> Self {
        Self {
            config,
            clients: HashMap::new(),
            nicks: HashMap::new(),
            channels: HashMap::new(),
            log_sink,
            state_sink,
        }
    }

    /// Create a channel actor and index its inbox. Used by JOIN for new
    /// channels and by the state loader before the listener starts.
    pub fn register_channel(
        &mut self,
        name: &str,
        topic: String,
        key: String,
        persist_initial: bool,
    ) -> mpsc::Sender<ChannelEvent> {
        let tx = ChannelActor::spawn(
            ChannelParams {
                name: name.to_string(),
                topic,
                key,
                hostname: self.config.hostname.clone(),
                log_sink: Arc::clone(&self.log_sink),
                state_sink: Arc::clone(&self.state_sink),
            },
            persist_initial,
        );
        self.channels.insert(name.to_string(), tx.clone());
        info!(channel = %name, "channel registered");
        tx
    }

    /// Move the daemon into its event-loop task.
    pub fn spawn(self) -> DaemonHandle {
        let (tx, rx) = mpsc::channel(INBOX);
        tokio::spawn(self.run(rx));
        DaemonHandle { tx }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<DaemonEvent>) {
        let mut sweep = tokio::time::interval(self.config.timeouts.check_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = sweep.tick() => self.sweep_aliveness(),
                event = rx.recv() => match event {
                    Some(DaemonEvent::Shutdown) | None => {
                        for tx in self.channels.values() {
                            let _ = tx.send(ChannelEvent::Term).await;
                        }
                        break;
                    }
                    Some(event) => self.handle_event(event).await,
                },
            }
        }
        info!("daemon stopped");
    }

    /// Close idle connections and probe quiet ones.
    fn sweep_aliveness(&mut self) {
        let now = std::time::Instant::now();
        let timeouts = &self.config.timeouts;
        for client in self.clients.values_mut() {
            let idle = now.duration_since(client.aliveness.last_seen);
            if idle > timeouts.ping_timeout {
                info!(nick = %client.nickname, addr = %client.peer.addr, "ping timeout");
                client.peer.close();
                continue;
            }
            if !client.aliveness.ping_sent && idle > timeouts.ping_threshold {
                if client.registered {
                    client
                        .peer
                        .send(Message::raw("PING", vec![], Some(self.config.hostname.clone())));
                    client.aliveness.ping_sent = true;
                } else {
                    info!(addr = %client.peer.addr, "ping timeout before registration");
                    client.peer.close();
                }
            }
        }
    }

    async fn handle_event(&mut self, event: DaemonEvent) {
        match event {
            DaemonEvent::New { peer } => {
                info!(id = peer.id, addr = %peer.addr, "new client");
                self.clients.insert(peer.id, Client::new(peer));
            }
            DaemonEvent::Del { id } => self.handle_del(id).await,
            DaemonEvent::Line { id, line } => {
                self.handle_line(id, &line).await;
                if let Some(client) = self.clients.get_mut(&id) {
                    client.aliveness.touch();
                }
            }
            DaemonEvent::Shutdown => {}
        }
    }

    async fn handle_del(&mut self, id: ClientId) {
        let Some(client) = self.clients.remove(&id) else {
            return;
        };
        info!(nick = %client.nickname, addr = %client.peer.addr, "client removed");
        self.nicks.retain(|_, owner| *owner != id);
        // Every channel decides membership for itself.
        for tx in self.channels.values() {
            let _ = tx.send(ChannelEvent::Quit { id }).await;
        }
    }

    async fn handle_line(&mut self, id: ClientId, line: &str) {
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest),
            None => (line, ""),
        };
        let command = command.to_ascii_uppercase();
        debug!(id, command = %command, "dispatch");

        if command == "QUIT" {
            if let Some(client) = self.clients.get(&id) {
                info!(nick = %client.nickname, "quit");
                client.peer.close();
            }
            return;
        }

        let registered = match self.clients.get(&id) {
            Some(client) => client.registered,
            None => return,
        };
        if !registered {
            self.register_step(id, &command, rest).await;
            return;
        }

        if let Err(e) = self.dispatch_command(id, &command, rest).await {
            if let Some(client) = self.clients.get(&id) {
                client
                    .peer
                    .send(e.to_reply(&self.config.hostname, &client.nickname));
            }
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Unregistered clients get PASS, NICK, and USER; everything else is
    /// silently ignored (QUIT is handled before we get here).
    async fn register_step(&mut self, id: ClientId, command: &str, rest: &str) {
        match command {
            "PASS" => {
                if rest.is_empty() {
                    self.numeric(
                        id,
                        Response::ERR_NEEDMOREPARAMS,
                        vec!["PASS".into()],
                        "Not enough parameters",
                    );
                    return;
                }
                if let Some(client) = self.clients.get_mut(&id) {
                    client.password = Some(rest.to_string());
                }
            }
            "NICK" => {
                if rest.is_empty() {
                    self.server_reply(
                        id,
                        Response::ERR_NONICKNAMEGIVEN,
                        vec![],
                        Some("No nickname given".into()),
                    );
                    return;
                }
                // Some clients prepend a colon to the nickname.
                let nickname = rest.strip_prefix(':').unwrap_or(rest);
                let lower = nickname.to_ascii_lowercase();
                if self.nicks.get(&lower).is_some_and(|owner| *owner != id) {
                    self.server_reply(
                        id,
                        Response::ERR_NICKNAMEINUSE,
                        vec!["*".into(), nickname.into()],
                        Some("Nickname is already in use".into()),
                    );
                    return;
                }
                if !is_valid_nick(nickname) {
                    self.server_reply(
                        id,
                        Response::ERR_ERRONEOUSNICKNAME,
                        vec!["*".into(), rest.into()],
                        Some("Erroneous nickname".into()),
                    );
                    return;
                }
                if let Some(client) = self.clients.get_mut(&id) {
                    let old = client.nickname.to_ascii_lowercase();
                    self.nicks.remove(&old);
                    client.nickname = nickname.to_string();
                    self.nicks.insert(lower, id);
                }
            }
            "USER" => {
                let args: Vec<&str> = rest.splitn(4, ' ').collect();
                if rest.is_empty() || args.len() < 4 {
                    self.numeric(
                        id,
                        Response::ERR_NEEDMOREPARAMS,
                        vec!["USER".into()],
                        "Not enough parameters",
                    );
                    return;
                }
                if let Some(client) = self.clients.get_mut(&id) {
                    client.username = args[0].to_string();
                    client.realname = args[3].strip_prefix(':').unwrap_or(args[3]).to_string();
                }
            }
            _ => return,
        }
        self.try_complete_registration(id).await;
    }

    async fn try_complete_registration(&mut self, id: ClientId) {
        let Some(client) = self.clients.get(&id) else {
            return;
        };
        if client.nickname == "*" || client.username.is_empty() {
            return;
        }

        if let Some(path) = self.config.passwords.clone() {
            let nickname = client.nickname.clone();
            let Some(password) = client.password.clone() else {
                self.reject_registration(id);
                return;
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => {
                    let denied = contents
                        .split('\n')
                        .filter(|entry| !entry.is_empty())
                        .filter_map(|entry| entry.split_once(':'))
                        .any(|(nick, pass)| nick == nickname && pass != password);
                    if denied {
                        self.reject_registration(id);
                        return;
                    }
                }
                Err(e) => {
                    // Refusing this client is recoverable; taking the whole
                    // server down for a bad file is not.
                    error!(path = %path.display(), error = %e, "cannot read passwords file");
                    self.reject_registration(id);
                    return;
                }
            }
        }

        if let Some(client) = self.clients.get_mut(&id) {
            client.registered = true;
        }
        let host = self.config.hostname.clone();
        self.numeric(id, Response::RPL_WELCOME, vec![], "Hi, welcome to IRC");
        self.numeric(
            id,
            Response::RPL_YOURHOST,
            vec![],
            format!(
                "Your host is {}, running tinyircd {}",
                host,
                env!("CARGO_PKG_VERSION")
            ),
        );
        self.numeric(
            id,
            Response::RPL_CREATED,
            vec![],
            "This server was created sometime",
        );
        self.numeric(
            id,
            Response::RPL_MYINFO,
            vec![],
            format!("{} tinyircd o o", host),
        );
        self.send_lusers(id);
        self.send_motd(id).await;
        if let Some(client) = self.clients.get(&id) {
            info!(nick = %client.nickname, addr = %client.peer.addr, "logged in");
        }
    }

    /// Registration denied: numeric 462, then close.
    fn reject_registration(&self, id: ClientId) {
        if let Some(client) = self.clients.get(&id) {
            client.peer.send(Message::reply(
                &self.config.hostname,
                Response::ERR_PASSWDMISMATCH,
                vec![],
                Some("You may not register".into()),
            ));
            client.peer.close();
        }
    }

    // ------------------------------------------------------------------
    // Registered-client commands
    // ------------------------------------------------------------------

    async fn dispatch_command(&mut self, id: ClientId, command: &str, rest: &str) -> HandlerResult {
        match command {
            "AWAY" => self.handle_away(id, rest),
            "JOIN" => {
                if rest.is_empty() {
                    return Err(HandlerError::NeedMoreParams("JOIN".into()));
                }
                self.handle_join(id, rest).await
            }
            "LIST" => self.handle_list(id, rest).await,
            "LUSERS" => {
                self.send_lusers(id);
                Ok(())
            }
            "MODE" => self.handle_mode(id, rest).await,
            "MOTD" => {
                self.send_motd(id).await;
                Ok(())
            }
            "PART" => self.handle_part(id, rest).await,
            "PING" => self.handle_ping(id, rest),
            "PONG" => Ok(()),
            "NOTICE" => self.handle_privmsg(id, rest, true).await,
            "PRIVMSG" => self.handle_privmsg(id, rest, false).await,
            "TOPIC" => self.handle_topic(id, rest).await,
            "WHO" => self.handle_who(id, rest).await,
            "WHOIS" => self.handle_whois(id, rest),
            "VERSION" => self.handle_version(id),
            _ => Err(HandlerError::UnknownCommand(command.to_string())),
        }
    }

    fn handle_away(&mut self, id: ClientId, rest: &str) -> HandlerResult {
        if rest.is_empty() {
            if let Some(client) = self.clients.get_mut(&id) {
                client.away = None;
            }
            self.numeric(
                id,
                Response::RPL_UNAWAY,
                vec![],
                "You are no longer marked as being away",
            );
        } else {
            let text = rest.strip_prefix(':').unwrap_or(rest).to_string();
            if let Some(client) = self.clients.get_mut(&id) {
                client.away = Some(text);
            }
            self.numeric(
                id,
                Response::RPL_NOWAWAY,
                vec![],
                "You have been marked as being away",
            );
        }
        Ok(())
    }

    async fn handle_join(&mut self, id: ClientId, rest: &str) -> HandlerResult {
        let mut args = rest.split(' ');
        let channels = args.next().unwrap_or("");
        let keys: Vec<&str> = args.next().unwrap_or("").split(',').collect();

        for (n, name) in channels.split(',').enumerate() {
            if !is_valid_channel_name(name) {
                if let Some(client) = self.clients.get(&id) {
                    client.peer.send(
                        HandlerError::NoSuchChannel(name.into())
                            .to_reply(&self.config.hostname, &client.nickname),
                    );
                }
                continue;
            }
            let key = keys
                .get(n)
                .copied()
                .filter(|k| !k.is_empty())
                .map(str::to_string);
            let Some(member) = self.member_of(id) else {
                return Ok(());
            };
            let existing = self.channels.get(name).cloned();
            let tx = match existing {
                Some(tx) => tx,
                None => self.register_channel(
                    name,
                    String::new(),
                    key.clone().unwrap_or_default(),
                    key.is_some(),
                ),
            };
            let (reply, reply_rx) = oneshot::channel();
            if tx
                .send(ChannelEvent::Join { member, key, reply })
                .await
                .is_err()
            {
                continue;
            }
            match reply_rx.await {
                Ok(Ok(())) => {
                    if let Some(client) = self.clients.get_mut(&id) {
                        client.channels.insert(name.to_string());
                    }
                }
                Ok(Err(e)) => {
                    if let Some(client) = self.clients.get(&id) {
                        client.peer.send(e.to_reply(
                            &self.config.hostname,
                            &client.nickname,
                            name,
                        ));
                    }
                }
                Err(_) => {}
            }
        }
        Ok(())
    }

    async fn handle_part(&mut self, id: ClientId, rest: &str) -> HandlerResult {
        if rest.is_empty() {
            return Err(HandlerError::NeedMoreParams("PART".into()));
        }
        for name in rest.split(',') {
            let Some(tx) = self.channels.get(name).cloned() else {
                if let Some(client) = self.clients.get(&id) {
                    client.peer.send(
                        HandlerError::NoSuchChannel(name.into())
                            .to_reply(&self.config.hostname, &client.nickname),
                    );
                }
                continue;
            };
            let (reply, reply_rx) = oneshot::channel();
            if tx.send(ChannelEvent::Part { id, reply }).await.is_err() {
                continue;
            }
            match reply_rx.await {
                Ok(Ok(())) => {
                    if let Some(client) = self.clients.get_mut(&id) {
                        client.channels.remove(name);
                    }
                }
                Ok(Err(e)) => {
                    if let Some(client) = self.clients.get(&id) {
                        client.peer.send(e.to_reply(
                            &self.config.hostname,
                            &client.nickname,
                            name,
                        ));
                    }
                }
                Err(_) => {}
            }
        }
        Ok(())
    }

    async fn handle_mode(&mut self, id: ClientId, rest: &str) -> HandlerResult {
        if rest.is_empty() {
            return Err(HandlerError::NeedMoreParams("MODE".into()));
        }
        let (target, flags) = match rest.split_once(' ') {
            Some((target, flags)) => (target, Some(flags)),
            None => (rest, None),
        };

        let Some(client) = self.clients.get(&id) else {
            return Ok(());
        };
        if target == client.username {
            return match flags {
                None => {
                    client.peer.send(Message::reply(
                        &self.config.hostname,
                        Response::RPL_UMODEIS,
                        vec![client.nickname.clone(), "+".into()],
                        None,
                    ));
                    Ok(())
                }
                Some(_) => Err(HandlerError::UnknownUserModeFlag),
            };
        }

        let Some(tx) = self.channels.get(target).cloned() else {
            return Err(HandlerError::NoSuchChannel(target.into()));
        };
        let member = client.member();
        let _ = tx
            .send(ChannelEvent::Mode {
                member,
                args: flags.unwrap_or("").to_string(),
            })
            .await;
        Ok(())
    }

    fn handle_ping(&self, id: ClientId, rest: &str) -> HandlerResult {
        if rest.is_empty() {
            return Err(HandlerError::NoOrigin);
        }
        if let Some(client) = self.clients.get(&id) {
            let host = &self.config.hostname;
            client.peer.send(Message::server(
                host,
                "PONG",
                vec![host.clone()],
                Some(rest.to_string()),
            ));
        }
        Ok(())
    }

    async fn handle_privmsg(&mut self, id: ClientId, rest: &str, notice: bool) -> HandlerResult {
        let verb = if notice { "NOTICE" } else { "PRIVMSG" };
        if rest.is_empty() {
            return Err(HandlerError::NoRecipient(verb.into()));
        }
        let Some((target, text)) = rest.split_once(' ') else {
            return Err(HandlerError::NoTextToSend);
        };
        let text = text.strip_prefix(':').unwrap_or(text);

        // A registered client's nickname takes precedence over channels.
        if let Some(&target_id) = self.nicks.get(&target.to_ascii_lowercase()) {
            let Some(sender) = self.clients.get(&id) else {
                return Ok(());
            };
            if let Some(peer_client) = self.clients.get(&target_id) {
                if peer_client.registered {
                    peer_client.peer.send(Message::from_user(
                        sender.prefix(),
                        verb,
                        vec![peer_client.nickname.clone()],
                        Some(text.to_string()),
                    ));
                    if let Some(away) = &peer_client.away {
                        sender.peer.send(Message::reply(
                            &self.config.hostname,
                            Response::RPL_AWAY,
                            vec![sender.nickname.clone(), peer_client.nickname.clone()],
                            Some(away.clone()),
                        ));
                    }
                    return Ok(());
                }
            }
        }

        let Some(tx) = self.channels.get(target).cloned() else {
            return Err(HandlerError::NoSuchNick(target.into()));
        };
        let Some(member) = self.member_of(id) else {
            return Ok(());
        };
        let _ = tx
            .send(ChannelEvent::Privmsg {
                member,
                notice,
                text: text.to_string(),
            })
            .await;
        Ok(())
    }

    async fn handle_topic(&mut self, id: ClientId, rest: &str) -> HandlerResult {
        if rest.is_empty() {
            return Err(HandlerError::NeedMoreParams("TOPIC".into()));
        }
        let (name, text) = match rest.split_once(' ') {
            Some((name, text)) => (name, text),
            None => (rest, ""),
        };
        let Some(tx) = self.channels.get(name).cloned() else {
            return Err(HandlerError::NoSuchChannel(name.into()));
        };
        let Some(member) = self.member_of(id) else {
            return Ok(());
        };
        let _ = tx
            .send(ChannelEvent::Topic {
                member,
                text: text.to_string(),
            })
            .await;
        Ok(())
    }

    async fn handle_who(&mut self, id: ClientId, rest: &str) -> HandlerResult {
        if rest.is_empty() {
            return Err(HandlerError::NeedMoreParams("WHO".into()));
        }
        let name = rest.split(' ').next().unwrap_or(rest);
        let Some(tx) = self.channels.get(name).cloned() else {
            return Err(HandlerError::NoSuchChannel(name.into()));
        };
        let Some(member) = self.member_of(id) else {
            return Ok(());
        };
        let _ = tx.send(ChannelEvent::Who { member }).await;
        Ok(())
    }

    fn handle_whois(&self, id: ClientId, rest: &str) -> HandlerResult {
        if rest.is_empty() {
            return Err(HandlerError::NeedMoreParams("WHOIS".into()));
        }
        let host = self.config.hostname.clone();
        // The last space-separated token is the comma-separated nick list.
        let targets = rest.rsplit(' ').next().unwrap_or(rest);
        for target in targets.split(',') {
            let subject = self
                .nicks
                .get(&target.to_ascii_lowercase())
                .and_then(|tid| self.clients.get(tid));
            let Some(subject) = subject else {
                if let Some(client) = self.clients.get(&id) {
                    client.peer.send(
                        HandlerError::NoSuchNick(target.into()).to_reply(&host, &client.nickname),
                    );
                }
                continue;
            };
            self.numeric_with(
                id,
                Response::RPL_WHOISUSER,
                vec![
                    subject.nickname.clone(),
                    subject.username.clone(),
                    subject.peer.host().to_string(),
                    "*".into(),
                ],
                subject.realname.clone(),
            );
            self.numeric_with(
                id,
                Response::RPL_WHOISSERVER,
                vec![subject.nickname.clone(), host.clone()],
                host.clone(),
            );
            if let Some(away) = &subject.away {
                self.numeric_with(
                    id,
                    Response::RPL_AWAY,
                    vec![subject.nickname.clone()],
                    away.clone(),
                );
            }
            let joined: Vec<String> = subject.channels.iter().cloned().collect();
            self.numeric_with(
                id,
                Response::RPL_WHOISCHANNELS,
                vec![subject.nickname.clone()],
                joined.join(" "),
            );
            self.numeric_with(
                id,
                Response::RPL_ENDOFWHOIS,
                vec![subject.nickname.clone()],
                "End of /WHOIS list".into(),
            );
        }
        Ok(())
    }

    async fn handle_list(&mut self, id: ClientId, rest: &str) -> HandlerResult {
        let mut names: Vec<String> = if rest.is_empty() {
            self.channels.keys().cloned().collect()
        } else {
            rest.split(' ')
                .next()
                .unwrap_or(rest)
                .split(',')
                .map(str::to_string)
                .collect()
        };
        names.sort();
        for name in names {
            let Some(tx) = self.channels.get(&name).cloned() else {
                continue;
            };
            let (reply, reply_rx) = oneshot::channel();
            if tx.send(ChannelEvent::Info { reply }).await.is_err() {
                continue;
            }
            if let Ok(info) = reply_rx.await {
                self.numeric(
                    id,
                    Response::RPL_LIST,
                    vec![info.name, info.member_count.to_string()],
                    info.topic,
                );
            }
        }
        self.numeric(id, Response::RPL_LISTEND, vec![], "End of /LIST");
        Ok(())
    }

    fn handle_version(&self, id: ClientId) -> HandlerResult {
        let version = if self.config.verbose {
            concat!(env!("CARGO_PKG_VERSION"), ".debug").to_string()
        } else {
            env!("CARGO_PKG_VERSION").to_string()
        };
        self.numeric_with(
            id,
            Response::RPL_VERSION,
            vec![version, self.config.hostname.clone()],
            String::new(),
        );
        Ok(())
    }

    fn send_lusers(&self, id: ClientId) {
        let registered = self.clients.values().filter(|c| c.registered).count();
        self.numeric(
            id,
            Response::RPL_LUSERCLIENT,
            vec![],
            format!("There are {} users and 0 invisible on 1 servers", registered),
        );
    }

    async fn send_motd(&self, id: ClientId) {
        let Some(path) = &self.config.motd else {
            self.numeric(id, Response::ERR_NOMOTD, vec![], "MOTD File is missing");
            return;
        };
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read motd file");
                self.numeric(id, Response::ERR_NOMOTD, vec![], "Error reading MOTD File");
                return;
            }
        };
        let host = &self.config.hostname;
        self.numeric(
            id,
            Response::RPL_MOTDSTART,
            vec![],
            format!("- {} Message of the day -", host),
        );
        for line in contents.trim_matches('\n').split('\n') {
            self.numeric(id, Response::RPL_MOTD, vec![], format!("- {}", line));
        }
        self.numeric(id, Response::RPL_ENDOFMOTD, vec![], "End of /MOTD command");
    }

    // ------------------------------------------------------------------
    // Reply helpers
    // ------------------------------------------------------------------

    /// Numeric reply addressed to the client's nickname, trailing text only.
    fn numeric(&self, id: ClientId, code: Response, params: Vec<String>, trailing: impl Into<String>) {
        self.numeric_with(id, code, params, trailing.into());
    }

    fn numeric_with(&self, id: ClientId, code: Response, params: Vec<String>, trailing: String) {
        if let Some(client) = self.clients.get(&id) {
            let mut full = vec![client.nickname.clone()];
            full.extend(params);
            client.peer.send(Message::reply(
                &self.config.hostname,
                code,
                full,
                Some(trailing),
            ));
        }
    }

    /// Numeric reply without the nickname prepended (431/432/433 shapes).
    fn server_reply(
        &self,
        id: ClientId,
        code: Response,
        params: Vec<String>,
        trailing: Option<String>,
    ) {
        if let Some(client) = self.clients.get(&id) {
            client
                .peer
                .send(Message::reply(&self.config.hostname, code, params, trailing));
        }
    }

    fn member_of(&self, id: ClientId) -> Option<Member> {
        self.clients.get(&id).map(Client::member)
    }
}
