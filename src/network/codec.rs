//! CRLF line framing.
//!
//! Decodes inbound bytes into command lines and encodes outbound
//! [`Message`]s with the CRLF terminator. The decode buffer is capped at
//! 3000 bytes (twice the IRC line limit); a peer that streams that much
//! without a delimiter gets its connection closed rather than unbounded
//! buffering.

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

use crate::proto::Message;

/// Maximum bytes buffered while waiting for a CRLF.
pub const MAX_LINE: usize = 3000;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("line exceeds maximum length ({MAX_LINE} bytes)")]
    LineTooLong,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Frames IRC lines on `\r\n` boundaries.
#[derive(Debug, Default)]
pub struct LineCodec;

impl Decoder for LineCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, CodecError> {
        loop {
            match src.windows(2).position(|w| w == b"\r\n") {
                Some(pos) => {
                    let line = src.split_to(pos);
                    src.advance(2);
                    let line = String::from_utf8_lossy(&line).into_owned();
                    // Blank keepalive lines are not commands.
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Ok(Some(line));
                }
                None => {
                    if src.len() >= MAX_LINE {
                        return Err(CodecError::LineTooLong);
                    }
                    return Ok(None);
                }
            }
        }
    }
}

impl Encoder<Message> for LineCodec {
    type Error = CodecError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), CodecError> {
        let line = msg.to_string();
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::Response;

    #[test]
    fn decode_complete_line() {
        let mut codec = LineCodec;
        let mut buf = BytesMut::from("NICK alice\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("NICK alice"));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_partial_then_complete() {
        let mut codec = LineCodec;
        let mut buf = BytesMut::from("NICK al");
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"ice\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("NICK alice"));
    }

    #[test]
    fn decode_two_lines_in_one_read() {
        let mut codec = LineCodec;
        let mut buf = BytesMut::from("NICK alice\r\nUSER alice 0 * :Alice\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("NICK alice"));
        assert_eq!(
            codec.decode(&mut buf).unwrap().as_deref(),
            Some("USER alice 0 * :Alice")
        );
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn decode_skips_empty_lines() {
        let mut codec = LineCodec;
        let mut buf = BytesMut::from("\r\n  \r\nPING srv\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PING srv"));
    }

    #[test]
    fn decode_rejects_oversized_line() {
        let mut codec = LineCodec;
        let mut buf = BytesMut::from(vec![b'A'; 4000].as_slice());
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::LineTooLong)
        ));
    }

    #[test]
    fn decode_below_cap_keeps_waiting() {
        let mut codec = LineCodec;
        let mut buf = BytesMut::from(vec![b'A'; MAX_LINE - 1].as_slice());
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn encode_appends_crlf() {
        let mut codec = LineCodec;
        let mut buf = BytesMut::new();
        let msg = Message::reply(
            "srv",
            Response::RPL_WELCOME,
            vec!["alice".into()],
            Some("Hi, welcome to IRC".into()),
        );
        codec.encode(msg, &mut buf).unwrap();
        assert_eq!(&buf[..], b":srv 001 alice :Hi, welcome to IRC\r\n");
    }
}
