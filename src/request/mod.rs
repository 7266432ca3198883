//! Request module - endpoints, credentials, and parameter assembly.
//!
//! Provides:
//! - [`Endpoint`] - single-user or site stream
//! - [`TokenPair`] - caller-held access token credentials
//! - [`StreamParams`] - ordered request parameters
//! - [`build_request`] - merges caller and mandatory parameters into an
//!   [`UnsignedRequest`] ready for signing
//!
//! # Example
//!
//! ```
//! use userstream::request::{build_request, Endpoint, StreamParams};
//! use userstream::SessionConfig;
//!
//! let params = StreamParams::new().with("with", "followings");
//! let request = build_request(&Endpoint::User, params, &SessionConfig::default()).unwrap();
//!
//! assert_eq!(request.params.get("delimited"), Some("length"));
//! assert_eq!(request.params.get("stall_warnings"), Some("true"));
//! assert_eq!(request.params.get("with"), Some("followings"));
//! ```

mod endpoint;
mod params;

pub use endpoint::{build_request, Endpoint, TokenPair, UnsignedRequest};
pub use params::{
    StreamParams, DELIMITED_KEY, DELIMITED_VALUE, FOLLOW_KEY, STALL_WARNINGS_KEY,
    STALL_WARNINGS_VALUE, URL_KEY,
};
