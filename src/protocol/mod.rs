//! Protocol module - wire format, tokens, and the incremental decoder.
//!
//! This module implements the length-delimited stream grammar:
//! - `CR LF` heartbeats
//! - `DIGITS CR LF` length lines followed by exactly that many payload bytes
//! - [`FrameDecoder`] for turning arbitrary chunks into [`Token`]s

mod frame_decoder;
mod token;
mod wire_format;

pub use frame_decoder::{DecoderState, FrameDecoder, DEFAULT_BUFFER_CAPACITY};
pub use token::Token;
pub use wire_format::{
    encode_frame, encode_frame_into, find_crlf, parse_length, pending_prefix_len, CRLF,
    DEFAULT_MAX_LENGTH_DIGITS, DEFAULT_MAX_PAYLOAD_SIZE, HEARTBEAT,
};
