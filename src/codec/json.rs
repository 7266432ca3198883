//! JSON codec using `serde_json`.
//!
//! Upstream payloads commonly carry a trailing `CR LF` inside the declared
//! length. `serde_json` accepts trailing whitespace, so such payloads decode
//! without stripping anything.

use serde_json::Value;

use crate::error::Result;

/// JSON codec for frame payloads.
pub struct JsonCodec;

impl JsonCodec {
    /// Decode payload bytes to a dynamic JSON value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not one complete JSON text.
    #[inline]
    pub fn decode(bytes: &[u8]) -> Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Convert an already decoded value into a typed message.
    #[inline]
    pub fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
        Ok(serde_json::from_value(value)?)
    }
}
