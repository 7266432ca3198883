//! Auth module - the request-signing boundary.
//!
//! This crate never computes signatures. The caller supplies an
//! [`Authenticator`] that turns an [`UnsignedRequest`] plus the caller's
//! [`TokenPair`] into a [`SignedRequest`] the transport can send as-is.
//!
//! Any `Fn(&UnsignedRequest, &TokenPair) -> Result<SignedRequest>` closure
//! is an authenticator.
//!
//! # Example
//!
//! ```
//! use userstream::auth::{Authenticator, SignedRequest};
//! use userstream::request::{build_request, Endpoint, StreamParams, TokenPair, UnsignedRequest};
//! use userstream::SessionConfig;
//!
//! let bearer = |request: &UnsignedRequest, tokens: &TokenPair| -> userstream::Result<SignedRequest> {
//!     Ok(SignedRequest::from_unsigned(request)
//!         .header("Authorization", format!("Bearer {}", tokens.key)))
//! };
//!
//! let unsigned = build_request(&Endpoint::User, StreamParams::new(), &SessionConfig::default()).unwrap();
//! let signed = bearer.sign(&unsigned, &TokenPair::new("abc", "")).unwrap();
//! assert_eq!(signed.header_value("authorization"), Some("Bearer abc"));
//! ```

use crate::error::Result;
use crate::request::{TokenPair, UnsignedRequest};

/// Signs outbound stream requests.
pub trait Authenticator: Send + Sync + 'static {
    /// Produce a sendable request for `request` on behalf of `tokens`.
    fn sign(&self, request: &UnsignedRequest, tokens: &TokenPair) -> Result<SignedRequest>;
}

impl<F> Authenticator for F
where
    F: Fn(&UnsignedRequest, &TokenPair) -> Result<SignedRequest> + Send + Sync + 'static,
{
    fn sign(&self, request: &UnsignedRequest, tokens: &TokenPair) -> Result<SignedRequest> {
        (self)(request, tokens)
    }
}

/// A signed request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// HTTP method.
    pub method: String,
    /// Target address, possibly with signed query parameters.
    pub url: String,
    /// Request headers, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Form-encoded body parameters.
    pub form: Vec<(String, String)>,
}

impl SignedRequest {
    /// Start from an unsigned request, sending its parameters as the form body.
    pub fn from_unsigned(request: &UnsignedRequest) -> Self {
        Self {
            method: request.method.to_string(),
            url: request.url.clone(),
            headers: Vec::new(),
            form: request.params.to_pairs(),
        }
    }

    /// Add a header, builder style.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether header `name` is present, compared case-insensitively.
    pub fn has_header(&self, name: &str) -> bool {
        self.header_value(name).is_some()
    }
}
