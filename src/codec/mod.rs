//! Codec module - payload decoding.
//!
//! Frame payloads are JSON text. [`JsonCodec`] turns the exact bytes of a
//! length-bounded payload into a [`serde_json::Value`], or into any
//! `DeserializeOwned` type when the caller knows the message shape.
//!
//! # Example
//!
//! ```
//! use userstream::codec::JsonCodec;
//!
//! let value = JsonCodec::decode(br#"{"id":12345}"#).unwrap();
//! assert_eq!(value["id"], 12345);
//!
//! assert!(JsonCodec::decode(b"{bad}").is_err());
//! ```

mod json;

pub use json::JsonCodec;
