//! Error types for command handling, channel operations, and sinks.
//!
//! Protocol-level failures map onto IRC numerics here so the actor loops can
//! stay free of reply-formatting noise. Transport failures never produce a
//! numeric; they close the connection instead.

use thiserror::Error;

use crate::proto::{Message, Response};

/// Errors raised while dispatching a registered client's command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("not enough parameters for {0}")]
    NeedMoreParams(String),

    #[error("no such channel: {0}")]
    NoSuchChannel(String),

    #[error("no such nick/channel: {0}")]
    NoSuchNick(String),

    #[error("no origin specified")]
    NoOrigin,

    #[error("no recipient given ({0})")]
    NoRecipient(String),

    #[error("no text to send")]
    NoTextToSend,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unknown user mode flag")]
    UnknownUserModeFlag,
}

impl HandlerError {
    /// Render the matching numeric reply, addressed to `nick`.
    pub fn to_reply(&self, host: &str, nick: &str) -> Message {
        let nick = nick.to_string();
        match self {
            Self::NeedMoreParams(cmd) => Message::reply(
                host,
                Response::ERR_NEEDMOREPARAMS,
                vec![nick, cmd.clone()],
                Some("Not enough parameters".into()),
            ),
            Self::NoSuchChannel(chan) => Message::reply(
                host,
                Response::ERR_NOSUCHCHANNEL,
                vec![nick, chan.clone()],
                Some("No such channel".into()),
            ),
            Self::NoSuchNick(target) => Message::reply(
                host,
                Response::ERR_NOSUCHNICK,
                vec![nick, target.clone()],
                Some("No such nick/channel".into()),
            ),
            Self::NoOrigin => Message::reply(
                host,
                Response::ERR_NOORIGIN,
                vec![nick],
                Some("No origin specified".into()),
            ),
            Self::NoRecipient(cmd) => Message::reply(
                host,
                Response::ERR_NORECIPIENT,
                vec![nick],
                Some(format!("No recipient given ({})", cmd)),
            ),
            Self::NoTextToSend => Message::reply(
                host,
                Response::ERR_NOTEXTTOSEND,
                vec![nick],
                Some("No text to send".into()),
            ),
            Self::UnknownCommand(cmd) => Message::reply(
                host,
                Response::ERR_UNKNOWNCOMMAND,
                vec![nick, cmd.clone()],
                Some("Unknown command".into()),
            ),
            Self::UnknownUserModeFlag => Message::reply(
                host,
                Response::ERR_UMODEUNKNOWNFLAG,
                vec![nick],
                Some("Unknown MODE flag".into()),
            ),
        }
    }
}

/// Result type for daemon command handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Channel-actor admission and membership errors, carried back to the daemon
/// over the event's oneshot reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("cannot join channel (+k)")]
    BadChannelKey,

    #[error("not on that channel")]
    NotOnChannel,
}

impl ChannelError {
    /// Render the matching numeric reply for an operation on `channel`.
    pub fn to_reply(&self, host: &str, nick: &str, channel: &str) -> Message {
        match self {
            Self::BadChannelKey => Message::reply(
                host,
                Response::ERR_BADCHANNELKEY,
                vec![nick.to_string(), channel.to_string()],
                Some("Cannot join channel (+k) - bad key".into()),
            ),
            Self::NotOnChannel => Message::reply(
                host,
                Response::ERR_NOTONCHANNEL,
                vec![nick.to_string(), channel.to_string()],
                Some("You are not on that channel".into()),
            ),
        }
    }
}

/// Failures in the best-effort log and state sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}
