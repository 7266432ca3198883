//! Event payload types.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::DecodeError;

/// Failure reported through the `error` event.
///
/// Serializes as `{"type": "response", "code": 404}` or
/// `{"type": "request", "detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ErrorEvent {
    /// Server answered with a status above 200.
    Response { code: u16 },
    /// The request could not be signed, sent, or established.
    Request { detail: String },
}

impl ErrorEvent {
    /// `"response"` or `"request"`.
    pub fn kind(&self) -> &'static str {
        match self {
            ErrorEvent::Response { .. } => "response",
            ErrorEvent::Request { .. } => "request",
        }
    }
}

impl fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorEvent::Response { code } => write!(f, "response status {}", code),
            ErrorEvent::Request { detail } => write!(f, "request failed: {}", detail),
        }
    }
}

/// Why a streaming connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Server ended the body.
    EndOfStream,
    /// Socket error while reading the body.
    Transport(String),
    /// Framing was lost; the connection was aborted.
    Malformed(DecodeError),
    /// Cancelled locally.
    Aborted,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::EndOfStream => f.write_str("socket end"),
            CloseReason::Transport(detail) => write!(f, "socket error: {}", detail),
            CloseReason::Malformed(err) => write!(f, "malformed stream: {}", err),
            CloseReason::Aborted => f.write_str("aborted"),
        }
    }
}

/// One event emitted by a session.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Response headers arrived with a success status.
    Connected,
    /// A frame decoded as JSON.
    Data(Value),
    /// A frame that did not parse, as raw bytes.
    Garbage(Bytes),
    /// Keep-alive.
    Heartbeat,
    /// Request or response failure.
    Error(ErrorEvent),
    /// Connection ended.
    Close(CloseReason),
}

impl StreamEvent {
    /// Event name as used by the upstream API clients.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Connected => "connected",
            StreamEvent::Data(_) => "data",
            StreamEvent::Garbage(_) => "garbage",
            StreamEvent::Heartbeat => "heartbeat",
            StreamEvent::Error(_) => "error",
            StreamEvent::Close(_) => "close",
        }
    }

    /// Whether nothing can follow this event on the same session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Error(_) | StreamEvent::Close(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_event_serialization() {
        let response = serde_json::to_value(ErrorEvent::Response { code: 404 }).unwrap();
        assert_eq!(response, json!({"type": "response", "code": 404}));

        let request = serde_json::to_value(ErrorEvent::Request {
            detail: "connection refused".to_string(),
        })
        .unwrap();
        assert_eq!(
            request,
            json!({"type": "request", "detail": "connection refused"})
        );
    }

    #[test]
    fn test_error_event_kind() {
        assert_eq!(ErrorEvent::Response { code: 500 }.kind(), "response");
        assert_eq!(
            ErrorEvent::Request {
                detail: String::new()
            }
            .kind(),
            "request"
        );
    }

    #[test]
    fn test_close_reason_display() {
        assert_eq!(CloseReason::EndOfStream.to_string(), "socket end");
        assert_eq!(CloseReason::Aborted.to_string(), "aborted");
        assert!(CloseReason::Malformed(DecodeError::EmptyLength)
            .to_string()
            .contains("empty length line"));
    }

    #[test]
    fn test_terminal_events() {
        assert!(StreamEvent::Close(CloseReason::Aborted).is_terminal());
        assert!(StreamEvent::Error(ErrorEvent::Response { code: 401 }).is_terminal());
        assert!(!StreamEvent::Heartbeat.is_terminal());
        assert!(!StreamEvent::Data(json!(null)).is_terminal());
        assert_eq!(StreamEvent::Garbage(Bytes::new()).name(), "garbage");
    }
}
