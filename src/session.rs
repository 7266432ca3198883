//! Session builder and streaming read loop.
//!
//! The [`SessionBuilder`] provides a fluent API for registering event
//! callbacks and configuring the connection. [`StreamSession`] tracks the
//! lifecycle of one connection:
//! 1. Assemble parameters and sign the request
//! 2. Send it and inspect the status line
//! 3. Feed body chunks through a [`FrameDecoder`]
//! 4. Emit events until the body ends, fails, or is cancelled
//!
//! ```text
//! Connecting ──► Streaming ──► Closed
//!      └───────────────────────▲
//! ```
//!
//! A session never reconnects. Open a new one after `close` or `error`.
//!
//! # Example
//!
//! ```ignore
//! use userstream::{Endpoint, SessionBuilder, StreamParams, TokenPair};
//!
//! #[tokio::main]
//! async fn main() -> userstream::Result<()> {
//!     let session = SessionBuilder::new()
//!         .authenticator(my_oauth_signer)
//!         .on_connected(|| println!("connected"))
//!         .on_data(|status| println!("{}", status))
//!         .on_close(|reason| println!("closed: {}", reason))
//!         .open(TokenPair::new(key, secret), Endpoint::User, StreamParams::new())?;
//!
//!     session.wait_for_close().await
//! }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::auth::Authenticator;
use crate::config::SessionConfig;
use crate::error::{Result, StreamError};
use crate::events::{CloseReason, ErrorEvent, EventHandlers, StreamEvent};
use crate::protocol::{FrameDecoder, Token};
use crate::request::{build_request, Endpoint, StreamParams, TokenPair};
use crate::transport::{
    with_default_headers, BodyStream, BoxFuture, HttpTransport, Transport, TransportResponse,
};

/// Lifecycle of a session. No transition leaves `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Request sent, waiting for response headers.
    Connecting,
    /// Success status received; body is being decoded.
    Streaming,
    /// Finished. Terminal.
    Closed,
}

/// Cloneable handle that cancels one session.
///
/// Safe to use from inside event callbacks.
#[derive(Debug, Clone)]
pub struct Canceller {
    token: CancellationToken,
}

impl Canceller {
    /// Abort the connection. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Builder for configuring and opening a [`StreamSession`].
pub struct SessionBuilder {
    handlers: EventHandlers,
    config: SessionConfig,
    authenticator: Option<Arc<dyn Authenticator>>,
    transport: Option<Arc<dyn Transport>>,
    cancel: CancellationToken,
}

impl SessionBuilder {
    /// Create a new session builder.
    pub fn new() -> Self {
        Self {
            handlers: EventHandlers::new(),
            config: SessionConfig::default(),
            authenticator: None,
            transport: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Register a `connected` callback.
    pub fn on_connected<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_connected(f);
        self
    }

    /// Register a `data` callback.
    pub fn on_data<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.handlers.on_data(f);
        self
    }

    /// Register a `garbage` callback.
    pub fn on_garbage<F>(mut self, f: F) -> Self
    where
        F: Fn(&Bytes) + Send + Sync + 'static,
    {
        self.handlers.on_garbage(f);
        self
    }

    /// Register a `heartbeat` callback.
    pub fn on_heartbeat<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_heartbeat(f);
        self
    }

    /// Register an `error` callback.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        self.handlers.on_error(f);
        self
    }

    /// Register a `close` callback.
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn(&CloseReason) + Send + Sync + 'static,
    {
        self.handlers.on_close(f);
        self
    }

    /// Register a callback that receives every event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&StreamEvent) + Send + Sync + 'static,
    {
        self.handlers.on_event(f);
        self
    }

    /// Set the request signer. Required.
    pub fn authenticator<A: Authenticator>(mut self, authenticator: A) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    /// Set the transport.
    ///
    /// Default: [`HttpTransport`]
    pub fn transport<T: Transport>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the single-user endpoint address.
    pub fn user_stream_url(mut self, url: impl Into<String>) -> Self {
        self.config.user_stream_url = url.into();
        self
    }

    /// Set the site endpoint address.
    pub fn site_stream_url(mut self, url: impl Into<String>) -> Self {
        self.config.site_stream_url = url.into();
        self
    }

    /// Set the maximum digits in a length line.
    ///
    /// Default: 16
    pub fn max_length_digits(mut self, digits: usize) -> Self {
        self.config.max_length_digits = digits;
        self
    }

    /// Set the maximum declared payload length.
    ///
    /// Default: 16 MiB
    pub fn max_payload_size(mut self, size: usize) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Set the initial residual buffer capacity.
    ///
    /// Default: 64 KiB
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Handle that will cancel the session this builder opens.
    ///
    /// Obtain it before `open` to cancel from inside callbacks.
    pub fn canceller(&self) -> Canceller {
        Canceller {
            token: self.cancel.clone(),
        }
    }

    /// Open a single-user stream.
    pub fn stream(self, tokens: TokenPair, params: StreamParams) -> Result<StreamSession> {
        self.open(tokens, Endpoint::User, params)
    }

    /// Open a site stream following `user_ids`.
    pub fn site_stream<I, S>(
        self,
        tokens: TokenPair,
        user_ids: I,
        params: StreamParams,
    ) -> Result<StreamSession>
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.open(tokens, Endpoint::site(user_ids), params)
    }

    /// Sign and send the request, then stream events on a background task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails without contacting the server when parameters are invalid, no
    /// authenticator is set, or signing fails. Failures after the request is
    /// handed to the transport are reported through events instead.
    pub fn open(
        self,
        tokens: TokenPair,
        endpoint: Endpoint,
        params: StreamParams,
    ) -> Result<StreamSession> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StreamError::Runtime(e.to_string()))?;

        let authenticator = self
            .authenticator
            .ok_or_else(|| StreamError::Auth("no authenticator configured".to_string()))?;

        let unsigned = build_request(&endpoint, params, &self.config)?;
        let signed = authenticator.sign(&unsigned, &tokens)?;
        let signed = with_default_headers(signed, &self.config.user_agent);

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        tracing::debug!(
            "Opening {} stream to {} ({} params)",
            endpoint.name(),
            signed.url,
            signed.form.len()
        );

        let (state_tx, state_rx) = watch::channel(SessionState::Connecting);
        let task = SessionTask {
            handlers: self.handlers,
            config: self.config,
            cancel: self.cancel.clone(),
            state: state_tx,
        };

        let response = transport.send(signed);
        let handle = runtime.spawn(async move {
            task.run(response).await;
        });

        Ok(StreamSession {
            cancel: self.cancel,
            state: state_rx,
            _task: handle,
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running stream connection.
///
/// Dropping the handle does not close the connection; call
/// [`cancel`](Self::cancel) for that.
pub struct StreamSession {
    cancel: CancellationToken,
    state: watch::Receiver<SessionState>,
    _task: JoinHandle<()>,
}

impl StreamSession {
    /// Create a new session builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Abort the connection.
    ///
    /// Idempotent, and safe after the session has closed. Once this
    /// returns, no further `data`, `garbage` or `heartbeat` callback is
    /// started; a callback already running on the session task finishes.
    /// The session then emits `close(Aborted)`.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!("Cancelling stream session");
        }
        self.cancel.cancel();
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Handle that cancels this session.
    pub fn canceller(&self) -> Canceller {
        Canceller {
            token: self.cancel.clone(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the session is closed.
    ///
    /// All events, including the final `close` or `error`, have been
    /// delivered when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Closed`] if the session task ended without
    /// emitting its final event, e.g. because a callback panicked.
    pub async fn wait_for_close(mut self) -> Result<()> {
        match self
            .state
            .wait_for(|state| *state == SessionState::Closed)
            .await
        {
            Ok(_) => Ok(()),
            Err(_) => {
                tracing::warn!("Stream session task exited before closing");
                Err(StreamError::Closed)
            }
        }
    }
}

/// State owned by the background task of one session.
struct SessionTask {
    handlers: EventHandlers,
    config: SessionConfig,
    cancel: CancellationToken,
    state: watch::Sender<SessionState>,
}

impl SessionTask {
    async fn run(self, response: BoxFuture<'static, Result<TransportResponse>>) {
        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.close(CloseReason::Aborted);
                return;
            }
            response = response => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Stream request failed: {}", e);
                self.fail(ErrorEvent::Request {
                    detail: e.to_string(),
                });
                return;
            }
        };

        if !response.is_success() {
            tracing::warn!("Stream rejected with status {}", response.status);
            let code = response.status;
            drop(response);
            self.fail(ErrorEvent::Response { code });
            return;
        }

        self.state.send_replace(SessionState::Streaming);
        tracing::debug!("Stream connected (status {})", response.status);
        self.emit(&StreamEvent::Connected);

        let reason = self.read_loop(response.body).await;
        self.close(reason);
    }

    /// Decode body chunks until the connection ends.
    ///
    /// The body is dropped on return, which aborts the transport.
    async fn read_loop(&self, mut body: BodyStream) -> CloseReason {
        let mut decoder = FrameDecoder::with_capacity_and_limits(
            self.config.buffer_capacity,
            self.config.max_length_digits,
            self.config.max_payload_size,
        );

        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return CloseReason::Aborted,
                chunk = body.next() => chunk,
            };

            let chunk = match chunk {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    tracing::warn!("Stream read error: {}", e);
                    return CloseReason::Transport(e.to_string());
                }
                None => return CloseReason::EndOfStream,
            };

            tracing::trace!("Received {} bytes", chunk.len());

            for token in decoder.feed(&chunk) {
                // A callback may have cancelled mid-chunk.
                if self.cancel.is_cancelled() {
                    return CloseReason::Aborted;
                }
                tracing::trace!("Decoded {}", token.kind());

                let event = match token {
                    Token::Heartbeat => StreamEvent::Heartbeat,
                    Token::Frame(value) => StreamEvent::Data(value),
                    Token::Garbage(raw) => {
                        tracing::debug!("Unparseable frame of {} bytes", raw.len());
                        StreamEvent::Garbage(raw)
                    }
                    Token::Error(e) => {
                        tracing::error!("Stream framing lost: {}", e);
                        return CloseReason::Malformed(e);
                    }
                };
                self.emit(&event);
            }
        }
    }

    fn emit(&self, event: &StreamEvent) {
        self.handlers.dispatch_until_cancelled(event, &self.cancel);
    }

    fn close(&self, reason: CloseReason) {
        tracing::debug!("Stream closed: {}", reason);
        self.handlers.dispatch(&StreamEvent::Close(reason));
        self.state.send_replace(SessionState::Closed);
    }

    fn fail(&self, error: ErrorEvent) {
        self.handlers.dispatch(&StreamEvent::Error(error));
        self.state.send_replace(SessionState::Closed);
    }
}
