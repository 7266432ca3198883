//! HTTP transport on `reqwest`.
//!
//! The client is built without a total request timeout: a stream response
//! never finishes on its own, so only connect time is bounded. Staleness
//! of an open stream is detected by the caller from the heartbeat cadence.

use std::time::Duration;

use futures::TryStreamExt;

use super::{BoxFuture, Transport, TransportResponse};
use crate::auth::SignedRequest;
use crate::error::{Result, StreamError};

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with default settings.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Underlying client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: SignedRequest) -> BoxFuture<'static, Result<TransportResponse>> {
        let client = self.client.clone();

        Box::pin(async move {
            let method = reqwest::Method::from_bytes(request.method.as_bytes())
                .map_err(|e| StreamError::Http(format!("bad method {:?}: {}", request.method, e)))?;

            let mut builder = client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if !request.form.is_empty() {
                builder = builder.form(&request.form);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes_stream().map_err(std::io::Error::other);

            Ok(TransportResponse::new(status, body))
        })
    }
}
