//! Wire format of a length-delimited stream.
//!
//! The response body is an unbounded sequence of two token kinds:
//!
//! ```text
//! heartbeat := CR LF
//! frame     := DIGIT+ CR LF payload      ; payload is exactly DIGIT+ bytes
//! ```
//!
//! Nothing follows a payload: the next byte starts the next token.
//! Payload boundaries come from the declared count only, never from
//! scanning for a terminator, so payloads may contain `CR LF` freely.

use bytes::{BufMut, BytesMut};

use crate::error::DecodeError;

/// Line terminator used by heartbeats and length lines.
pub const CRLF: &[u8; 2] = b"\r\n";

/// A heartbeat is a bare terminator.
pub const HEARTBEAT: &[u8; 2] = CRLF;

/// Default maximum number of digits accepted in a length line.
pub const DEFAULT_MAX_LENGTH_DIGITS: usize = 16;

/// Default maximum declared payload size (16 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Position of the first `CR LF` in `buf`, if any.
#[inline]
pub fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}

/// Parse the digits of a length line (terminator already stripped).
///
/// # Example
///
/// ```
/// use userstream::protocol::parse_length;
///
/// assert_eq!(parse_length(b"1234", 16).unwrap(), 1234);
/// assert!(parse_length(b"", 16).is_err());
/// assert!(parse_length(b"12a", 16).is_err());
/// ```
pub fn parse_length(digits: &[u8], max_digits: usize) -> Result<usize, DecodeError> {
    if digits.is_empty() {
        return Err(DecodeError::EmptyLength);
    }
    if digits.len() > max_digits {
        return Err(DecodeError::LengthTooLong { max_digits });
    }
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(DecodeError::MalformedLength {
            line: String::from_utf8_lossy(digits).into_owned(),
        });
    }

    digits.iter().try_fold(0usize, |acc, &d| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(usize::from(d - b'0')))
            .ok_or_else(|| DecodeError::LengthOverflow {
                line: String::from_utf8_lossy(digits).into_owned(),
            })
    })
}

/// Length of an unterminated prefix that still counts toward the digit limit.
///
/// A trailing `CR` may be the first half of the terminator, so it is not
/// counted.
#[inline]
pub fn pending_prefix_len(buf: &[u8]) -> usize {
    match buf.last() {
        Some(b'\r') => buf.len() - 1,
        _ => buf.len(),
    }
}

/// Append one length-delimited frame to `buf`.
pub fn encode_frame_into(buf: &mut BytesMut, payload: &[u8]) {
    let digits = payload.len().to_string();
    buf.reserve(digits.len() + CRLF.len() + payload.len());
    buf.put_slice(digits.as_bytes());
    buf.put_slice(CRLF);
    buf.put_slice(payload);
}

/// Build one length-delimited frame.
///
/// # Example
///
/// ```
/// use userstream::protocol::encode_frame;
///
/// assert_eq!(encode_frame(b"{}"), b"2\r\n{}".to_vec());
/// ```
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    encode_frame_into(&mut buf, payload);
    buf.to_vec()
}
