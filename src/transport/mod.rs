//! Transport module - sending signed requests and streaming response bodies.
//!
//! Provides abstraction over:
//! - [`HttpTransport`] - HTTP(S) via `reqwest`, the default
//! - any other [`Transport`] implementation (in-memory, proxies, tests)
//!
//! Aborting a connection means dropping the in-flight send future or the
//! response [`BodyStream`]; implementations must release the socket then.

mod http;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

use crate::auth::SignedRequest;
use crate::error::Result;

pub use http::HttpTransport;

/// Boxed future for transport results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Response body as an ordered stream of byte chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Headers the upstream API expects on every stream request.
pub const ACCEPT: &str = "*/*";
/// Streams are never reused, so ask the server not to keep the socket alive.
pub const CONNECTION: &str = "close";

/// Status and body of a response whose headers have arrived.
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, not yet read.
    pub body: BodyStream,
}

impl TransportResponse {
    /// Create a response from a status and any chunk stream.
    pub fn new<S>(status: u16, body: S) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        Self {
            status,
            body: Box::pin(body),
        }
    }

    /// Whether the status allows streaming. Anything above 200 is a rejection.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status <= 200
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends a signed request and resolves once response headers arrive.
pub trait Transport: Send + Sync + 'static {
    /// Send `request`. Errors are request-level failures (connect, TLS, ...).
    fn send(&self, request: SignedRequest) -> BoxFuture<'static, Result<TransportResponse>>;
}

/// Add `Accept`, `Connection` and `User-Agent` unless the authenticator set them.
pub fn with_default_headers(mut request: SignedRequest, user_agent: &str) -> SignedRequest {
    for (name, value) in [
        ("Accept", ACCEPT),
        ("Connection", CONNECTION),
        ("User-Agent", user_agent),
    ] {
        if !request.has_header(name) {
            request = request.header(name, value);
        }
    }
    request
}
