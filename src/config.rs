//! Session configuration.
//!
//! All fields have defaults matching the public streaming API. Set them
//! through the [`SessionBuilder`](crate::SessionBuilder) setters or build a
//! [`SessionConfig`] directly.

use crate::protocol::{DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_LENGTH_DIGITS, DEFAULT_MAX_PAYLOAD_SIZE};

/// Default single-user streaming endpoint.
pub const USER_STREAM_URL: &str = "https://userstream.twitter.com/1.1/user.json";

/// Default multi-user ("site") streaming endpoint.
pub const SITE_STREAM_URL: &str = "https://sitestream.twitter.com/1.1/site.json";

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "userstream.rs";

/// Configuration shared by every connection a session opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Address of the single-user endpoint.
    pub user_stream_url: String,
    /// Address of the site endpoint.
    pub site_stream_url: String,
    /// Maximum digits in a length line before the stream is declared misaligned.
    pub max_length_digits: usize,
    /// Maximum declared payload length.
    pub max_payload_size: usize,
    /// Initial capacity of the residual buffer.
    pub buffer_capacity: usize,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_stream_url: USER_STREAM_URL.to_string(),
            site_stream_url: SITE_STREAM_URL.to_string(),
            max_length_digits: DEFAULT_MAX_LENGTH_DIGITS,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
