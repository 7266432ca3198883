//! Incremental decoder for length-delimited streams.
//!
//! Uses `bytes::BytesMut` as the residual buffer and a two-state machine:
//! - `AwaitingLengthOrHeartbeat`: expecting `CR LF` or `DIGITS CR LF`
//! - `AccumulatingPayload`: length parsed, waiting for the declared bytes
//!
//! Chunk sizes are arbitrary and unrelated to token boundaries. Feeding the
//! same bytes split at any offsets yields the same tokens in the same order.
//!
//! # Example
//!
//! ```
//! use userstream::protocol::{FrameDecoder, Token};
//!
//! let mut decoder = FrameDecoder::new();
//!
//! assert!(decoder.feed(b"12\r\n{\"id\":123").is_empty());
//!
//! let tokens = decoder.feed(b"45}\r\n");
//! assert_eq!(tokens.len(), 2);
//! assert!(matches!(tokens[0], Token::Frame(_)));
//! assert_eq!(tokens[1], Token::Heartbeat);
//! ```

use bytes::BytesMut;

use super::wire_format::{
    find_crlf, parse_length, pending_prefix_len, CRLF, DEFAULT_MAX_LENGTH_DIGITS,
    DEFAULT_MAX_PAYLOAD_SIZE, HEARTBEAT,
};
use super::Token;
use crate::codec::JsonCodec;
use crate::error::DecodeError;

/// Default initial capacity of the residual buffer (64 KiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Internal parse state.
#[derive(Debug, Clone, Copy)]
enum State {
    AwaitingLengthOrHeartbeat,
    AccumulatingPayload { length: usize },
    Failed,
}

/// Externally visible decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No partial frame in progress.
    AwaitingLengthOrHeartbeat,
    /// A declared-length payload is being assembled; `remaining` bytes are still missing.
    AccumulatingPayload { remaining: usize },
    /// A fatal error was produced; all further input is ignored.
    Failed,
}

/// Decoder that turns byte chunks into [`Token`]s.
///
/// Single-owner and synchronous: `feed` runs to completion, never blocks,
/// and extracts every complete token currently buffered.
pub struct FrameDecoder {
    /// Bytes received but not yet attributed to a complete token.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum digits in a length line.
    max_length_digits: usize,
    /// Maximum declared payload length.
    max_payload_size: usize,
}

impl FrameDecoder {
    /// Create a decoder with default limits.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_LENGTH_DIGITS, DEFAULT_MAX_PAYLOAD_SIZE)
    }

    /// Create a decoder with custom limits.
    pub fn with_limits(max_length_digits: usize, max_payload_size: usize) -> Self {
        Self::with_capacity_and_limits(DEFAULT_BUFFER_CAPACITY, max_length_digits, max_payload_size)
    }

    /// Create a decoder with custom initial capacity and limits.
    pub fn with_capacity_and_limits(
        capacity: usize,
        max_length_digits: usize,
        max_payload_size: usize,
    ) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            state: State::AwaitingLengthOrHeartbeat,
            max_length_digits,
            max_payload_size,
        }
    }

    /// Push a chunk and extract every complete token.
    ///
    /// Returns the tokens in byte order. If a fatal error is hit, the
    /// [`Token::Error`] is the last element and every later call returns an
    /// empty vector.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Token> {
        self.extend(chunk);

        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn extend(&mut self, chunk: &[u8]) {
        if matches!(self.state, State::Failed) {
            return;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Extract the next complete token, if the buffer holds one.
    ///
    /// Returns `None` when more bytes are needed or after a fatal error.
    fn next_token(&mut self) -> Option<Token> {
        loop {
            match self.state {
                State::Failed => return None,

                State::AwaitingLengthOrHeartbeat => {
                    if self.buffer.starts_with(HEARTBEAT) {
                        let _ = self.buffer.split_to(HEARTBEAT.len());
                        return Some(Token::Heartbeat);
                    }

                    let Some(pos) = find_crlf(&self.buffer) else {
                        if pending_prefix_len(&self.buffer) > self.max_length_digits {
                            return Some(self.fail(DecodeError::LengthTooLong {
                                max_digits: self.max_length_digits,
                            }));
                        }
                        return None;
                    };

                    let length = match parse_length(&self.buffer[..pos], self.max_length_digits) {
                        Ok(length) => length,
                        Err(e) => return Some(self.fail(e)),
                    };

                    if length > self.max_payload_size {
                        return Some(self.fail(DecodeError::PayloadTooLarge {
                            length,
                            max: self.max_payload_size,
                        }));
                    }

                    let _ = self.buffer.split_to(pos + CRLF.len());

                    // Zero-length frames carry nothing; stay put and keep scanning.
                    if length > 0 {
                        self.state = State::AccumulatingPayload { length };
                    }
                }

                State::AccumulatingPayload { length } => {
                    if self.buffer.len() < length {
                        return None;
                    }

                    let payload = self.buffer.split_to(length).freeze();
                    self.state = State::AwaitingLengthOrHeartbeat;

                    return Some(match JsonCodec::decode(&payload) {
                        Ok(value) => Token::Frame(value),
                        Err(_) => Token::Garbage(payload),
                    });
                }
            }
        }
    }

    fn fail(&mut self, error: DecodeError) -> Token {
        self.state = State::Failed;
        self.buffer.clear();
        Token::Error(error)
    }

    /// Current decoder state.
    ///
    /// Every complete token is extracted by [`feed`](Self::feed), so a
    /// reported `AccumulatingPayload` always has `remaining >= 1`.
    pub fn state(&self) -> DecoderState {
        match self.state {
            State::AwaitingLengthOrHeartbeat => DecoderState::AwaitingLengthOrHeartbeat,
            State::AccumulatingPayload { length } => DecoderState::AccumulatingPayload {
                remaining: length.saturating_sub(self.buffer.len()),
            },
            State::Failed => DecoderState::Failed,
        }
    }

    /// Whether a fatal error has been produced.
    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    /// Number of buffered bytes not yet attributed to a token.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the residual buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset state, including a failed state.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = State::AwaitingLengthOrHeartbeat;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_frame;
    use bytes::Bytes;
    use serde_json::json;

    #[test]
    fn test_single_complete_frame() {
        let mut decoder = FrameDecoder::new();

        let tokens = decoder.feed(b"12\r\n{\"id\":12345}");

        assert_eq!(tokens, vec![Token::Frame(json!({"id": 12345}))]);
        assert!(decoder.is_empty());
        assert_eq!(decoder.state(), DecoderState::AwaitingLengthOrHeartbeat);
    }

    #[test]
    fn test_fragmented_payload() {
        let mut decoder = FrameDecoder::new();

        assert!(decoder.feed(b"12\r\n{\"id\":123").is_empty());
        assert_eq!(
            decoder.state(),
            DecoderState::AccumulatingPayload { remaining: 3 }
        );

        let tokens = decoder.feed(b"45}");
        assert_eq!(tokens, vec![Token::Frame(json!({"id": 12345}))]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_frame_heartbeat_frame() {
        let mut decoder = FrameDecoder::new();

        let tokens = decoder.feed(b"12\r\n{\"id\":12345}\r\n12\r\n{\"id\":67890}");

        assert_eq!(
            tokens,
            vec![
                Token::Frame(json!({"id": 12345})),
                Token::Heartbeat,
                Token::Frame(json!({"id": 67890})),
            ]
        );
    }

    #[test]
    fn test_heartbeat_only() {
        let mut decoder = FrameDecoder::new();

        assert_eq!(decoder.feed(b"\r\n"), vec![Token::Heartbeat]);
        assert!(decoder.is_empty());
        assert_eq!(decoder.state(), DecoderState::AwaitingLengthOrHeartbeat);
    }

    #[test]
    fn test_split_heartbeat() {
        let mut decoder = FrameDecoder::new();

        assert!(decoder.feed(b"\r").is_empty());
        assert_eq!(decoder.len(), 1);
        assert_eq!(decoder.feed(b"\n"), vec![Token::Heartbeat]);
    }

    #[test]
    fn test_many_heartbeats_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let chunk = b"\r\n".repeat(10_000);

        let tokens = decoder.feed(&chunk);

        assert_eq!(tokens.len(), 10_000);
        assert!(tokens.iter().all(|t| *t == Token::Heartbeat));
    }

    #[test]
    fn test_garbage_payload() {
        let mut decoder = FrameDecoder::new();

        let tokens = decoder.feed(b"5\r\n{bad}");

        assert_eq!(tokens, vec![Token::Garbage(Bytes::from_static(b"{bad}"))]);
        assert_eq!(decoder.state(), DecoderState::AwaitingLengthOrHeartbeat);
    }

    #[test]
    fn test_garbage_then_frame_recovers() {
        let mut decoder = FrameDecoder::new();

        let tokens = decoder.feed(b"5\r\n{bad}2\r\n[]");

        assert_eq!(
            tokens,
            vec![
                Token::Garbage(Bytes::from_static(b"{bad}")),
                Token::Frame(json!([])),
            ]
        );
    }

    #[test]
    fn test_payload_containing_crlf() {
        let mut decoder = FrameDecoder::new();
        let payload = b"{\"text\":\"a\"}\r\n";

        let tokens = decoder.feed(&encode_frame(payload));

        assert_eq!(tokens, vec![Token::Frame(json!({"text": "a"}))]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_zero_length_frame_is_skipped() {
        let mut decoder = FrameDecoder::new();

        let tokens = decoder.feed(b"0\r\n2\r\n{}");

        assert_eq!(tokens, vec![Token::Frame(json!({}))]);
    }

    #[test]
    fn test_non_numeric_length_is_fatal() {
        let mut decoder = FrameDecoder::new();

        let tokens = decoder.feed(b"\r\nab\r\n2\r\n{}");

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::Heartbeat);
        assert!(matches!(
            tokens[1],
            Token::Error(DecodeError::MalformedLength { .. })
        ));
        assert!(decoder.is_failed());
        assert_eq!(decoder.state(), DecoderState::Failed);
    }

    #[test]
    fn test_failed_decoder_ignores_input() {
        let mut decoder = FrameDecoder::new();

        let _ = decoder.feed(b"x\r\n");
        assert!(decoder.is_failed());

        assert!(decoder.feed(b"2\r\n{}").is_empty());
        assert!(decoder.feed(b"\r\n").is_empty());
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_unterminated_prefix_is_bounded() {
        let mut decoder = FrameDecoder::with_limits(4, DEFAULT_MAX_PAYLOAD_SIZE);

        assert!(decoder.feed(b"1234").is_empty());
        assert!(decoder.feed(b"\r").is_empty());

        let mut decoder = FrameDecoder::with_limits(4, DEFAULT_MAX_PAYLOAD_SIZE);
        let tokens = decoder.feed(b"12345");
        assert_eq!(
            tokens,
            vec![Token::Error(DecodeError::LengthTooLong { max_digits: 4 })]
        );
    }

    #[test]
    fn test_declared_length_over_limit() {
        let mut decoder = FrameDecoder::with_limits(16, 100);

        let tokens = decoder.feed(b"1000\r\n");

        assert_eq!(
            tokens,
            vec![Token::Error(DecodeError::PayloadTooLarge {
                length: 1000,
                max: 100
            })]
        );
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut decoder = FrameDecoder::new();
        let mut stream = encode_frame(b"{\"a\":1}");
        stream.extend_from_slice(b"\r\n");
        stream.extend_from_slice(&encode_frame(b"nope"));

        let mut all = Vec::new();
        for byte in &stream {
            all.extend(decoder.feed(&[*byte]));
        }

        assert_eq!(
            all,
            vec![
                Token::Frame(json!({"a": 1})),
                Token::Heartbeat,
                Token::Garbage(Bytes::from_static(b"nope")),
            ]
        );
    }

    #[test]
    fn test_remaining_decreases() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"10\r\n");
        assert_eq!(
            decoder.state(),
            DecoderState::AccumulatingPayload { remaining: 10 }
        );
        decoder.feed(b"1234");
        assert_eq!(
            decoder.state(),
            DecoderState::AccumulatingPayload { remaining: 6 }
        );
    }

    #[test]
    fn test_next_token_pulls_one_at_a_time() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"\r\n\r\n2\r\n{}");

        assert_eq!(decoder.next_token(), Some(Token::Heartbeat));
        assert_eq!(decoder.next_token(), Some(Token::Heartbeat));
        assert_eq!(decoder.next_token(), Some(Token::Frame(json!({}))));
        assert_eq!(decoder.next_token(), None);
    }

    #[test]
    fn test_completed_payload_leaves_accumulating_state() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"3\r\n");
        assert_eq!(
            decoder.state(),
            DecoderState::AccumulatingPayload { remaining: 3 }
        );
        decoder.feed(b"ab");
        assert_eq!(
            decoder.state(),
            DecoderState::AccumulatingPayload { remaining: 1 }
        );

        let tokens = decoder.feed(b"c");

        assert_eq!(tokens, vec![Token::Garbage(Bytes::from_static(b"abc"))]);
        assert_eq!(decoder.state(), DecoderState::AwaitingLengthOrHeartbeat);
    }

    #[test]
    fn test_reset_clears_failure() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"zz\r\n");
        assert!(decoder.is_failed());

        decoder.reset();

        assert_eq!(decoder.feed(b"\r\n"), vec![Token::Heartbeat]);
    }
}
