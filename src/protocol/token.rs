//! Tokens produced by the frame decoder.

use bytes::Bytes;
use serde_json::Value;

use crate::error::DecodeError;

/// One decoded unit of the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare keep-alive terminator.
    Heartbeat,
    /// Length-bounded payload that parsed as JSON.
    Frame(Value),
    /// Length-bounded payload that failed to parse; holds exactly the declared bytes.
    Garbage(Bytes),
    /// Fatal framing error. Always the last token a decoder produces.
    Error(DecodeError),
}

impl Token {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Heartbeat => "heartbeat",
            Token::Frame(_) => "frame",
            Token::Garbage(_) => "garbage",
            Token::Error(_) => "error",
        }
    }

    /// Whether this token ends decoding for the connection.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Token::Error(_))
    }
}
