//! Outbound IRC message construction and serialization.
//!
//! Wire format per RFC 2812:
//!
//! ```text
//! [:prefix SPACE] command [SPACE params] [SPACE : trailing]
//! ```
//!
//! The CRLF terminator is appended by the codec, not here. The trailing
//! parameter is kept separate from the middle parameters so that replies
//! like `324 nick #chan +` (no trailing) and `331 nick #chan :No topic is
//! set` (always-colon trailing) both serialize exactly.

use std::fmt;

use super::Response;

/// Message source, serialized before the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    /// `:<hostname>`, a reply originating from the server.
    Server(String),
    /// `:<nick>!<user>@<host>`, a command relayed on behalf of a user.
    User {
        nick: String,
        user: String,
        host: String,
    },
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Server(host) => write!(f, "{}", host),
            Prefix::User { nick, user, host } => write!(f, "{}!{}@{}", nick, user, host),
        }
    }
}

/// A single outbound IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub prefix: Option<Prefix>,
    pub command: String,
    pub params: Vec<String>,
    pub trailing: Option<String>,
}

impl Message {
    /// A server-prefixed numeric reply.
    pub fn reply(
        host: &str,
        code: Response,
        params: Vec<String>,
        trailing: Option<String>,
    ) -> Self {
        Self {
            prefix: Some(Prefix::Server(host.to_string())),
            command: code.to_string(),
            params,
            trailing,
        }
    }

    /// A server-prefixed non-numeric command (e.g. the PONG reply).
    pub fn server(host: &str, command: &str, params: Vec<String>, trailing: Option<String>) -> Self {
        Self {
            prefix: Some(Prefix::Server(host.to_string())),
            command: command.to_string(),
            params,
            trailing,
        }
    }

    /// A user-prefixed command relayed by the server (JOIN, PART, PRIVMSG...).
    pub fn from_user(
        prefix: Prefix,
        command: &str,
        params: Vec<String>,
        trailing: Option<String>,
    ) -> Self {
        Self {
            prefix: Some(prefix),
            command: command.to_string(),
            params,
            trailing,
        }
    }

    /// An unprefixed line (the liveness `PING :<hostname>` probe).
    pub fn raw(command: &str, params: Vec<String>, trailing: Option<String>) -> Self {
        Self {
            prefix: None,
            command: command.to_string(),
            params,
            trailing,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        if let Some(trailing) = &self.trailing {
            write!(f, " :{}", trailing)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_with_trailing() {
        let msg = Message::reply(
            "srv",
            Response::RPL_NOTOPIC,
            vec!["alice".into(), "#room".into()],
            Some("No topic is set".into()),
        );
        assert_eq!(msg.to_string(), ":srv 331 alice #room :No topic is set");
    }

    #[test]
    fn numeric_without_trailing() {
        let msg = Message::reply(
            "srv",
            Response::RPL_CHANNELMODEIS,
            vec!["alice".into(), "#room".into(), "+".into()],
            None,
        );
        assert_eq!(msg.to_string(), ":srv 324 alice #room +");
    }

    #[test]
    fn single_word_trailing_keeps_colon() {
        let msg = Message::reply(
            "srv",
            Response::RPL_NAMREPLY,
            vec!["alice".into(), "=".into(), "#room".into()],
            Some("alice".into()),
        );
        assert_eq!(msg.to_string(), ":srv 353 alice = #room :alice");
    }

    #[test]
    fn empty_trailing_serializes_bare_colon() {
        let msg = Message::reply(
            "srv",
            Response::RPL_VERSION,
            vec!["alice".into(), "0.1.0".into(), "srv".into()],
            Some(String::new()),
        );
        assert_eq!(msg.to_string(), ":srv 351 alice 0.1.0 srv :");
    }

    #[test]
    fn user_prefix_form() {
        let prefix = Prefix::User {
            nick: "alice".into(),
            user: "alice".into(),
            host: "127.0.0.1:50000".into(),
        };
        let msg = Message::from_user(prefix, "PRIVMSG", vec!["#room".into()], Some("hello".into()));
        assert_eq!(
            msg.to_string(),
            ":alice!alice@127.0.0.1:50000 PRIVMSG #room :hello"
        );
    }

    #[test]
    fn mode_broadcast_has_no_colon_on_key() {
        let prefix = Prefix::User {
            nick: "alice".into(),
            user: "a".into(),
            host: "h".into(),
        };
        let msg = Message::from_user(
            prefix,
            "MODE",
            vec!["#priv".into(), "+k".into(), "s3cret".into()],
            None,
        );
        assert_eq!(msg.to_string(), ":alice!a@h MODE #priv +k s3cret");
    }

    #[test]
    fn unprefixed_ping() {
        let msg = Message::raw("PING", vec![], Some("srv".into()));
        assert_eq!(msg.to_string(), "PING :srv");
    }
}
