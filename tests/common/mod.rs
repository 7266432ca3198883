//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::channel::mpsc;
use futures::stream;
use userstream::auth::SignedRequest;
use userstream::request::{TokenPair, UnsignedRequest};
use userstream::transport::{BoxFuture, Transport, TransportResponse};
use userstream::{StreamError, StreamEvent};

/// Event log filled by a session's catch-all callback.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<StreamEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback to pass to `on_event`.
    pub fn sink(&self) -> impl Fn(&StreamEvent) + Send + Sync + 'static {
        let events = self.events.clone();
        move |event: &StreamEvent| events.lock().unwrap().push(event.clone())
    }

    pub fn events(&self) -> Vec<StreamEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

/// Authenticator that passes parameters through and records what it signed.
#[derive(Clone, Default)]
pub struct RecordingSigner {
    pub signed: Arc<Mutex<Vec<(UnsignedRequest, TokenPair)>>>,
}

impl RecordingSigner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl userstream::auth::Authenticator for RecordingSigner {
    fn sign(
        &self,
        request: &UnsignedRequest,
        tokens: &TokenPair,
    ) -> userstream::Result<SignedRequest> {
        self.signed
            .lock()
            .unwrap()
            .push((request.clone(), tokens.clone()));
        Ok(SignedRequest::from_unsigned(request)
            .header("Authorization", format!("Test {}", tokens.key)))
    }
}

/// Transport that replays a fixed response.
pub struct ScriptedTransport {
    status: u16,
    chunks: Vec<io::Result<Vec<u8>>>,
    fail: Option<String>,
    pub sent: Arc<Mutex<Vec<SignedRequest>>>,
}

impl ScriptedTransport {
    /// Respond with `status` and then the given body chunks.
    pub fn respond(status: u16, chunks: &[&[u8]]) -> Self {
        Self {
            status,
            chunks: chunks.iter().map(|c| Ok(c.to_vec())).collect(),
            fail: None,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the body with a read error after the chunks.
    pub fn then_error(mut self, message: &str) -> Self {
        self.chunks.push(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            message.to_string(),
        )));
        self
    }

    /// Fail the request before any response.
    pub fn refuse(message: &str) -> Self {
        Self {
            status: 0,
            chunks: Vec::new(),
            fail: Some(message.to_string()),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: SignedRequest) -> BoxFuture<'static, userstream::Result<TransportResponse>> {
        self.sent.lock().unwrap().push(request);

        if let Some(message) = self.fail.clone() {
            return Box::pin(async move { Err(StreamError::Http(message)) });
        }

        let status = self.status;
        let chunks: Vec<io::Result<Bytes>> = self
            .chunks
            .iter()
            .map(|c| match c {
                Ok(bytes) => Ok(Bytes::from(bytes.clone())),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            })
            .collect();

        Box::pin(async move { Ok(TransportResponse::new(status, stream::iter(chunks))) })
    }
}

/// Transport whose body is fed chunk by chunk from the test.
pub struct ChannelTransport {
    status: u16,
    body: Mutex<Option<mpsc::UnboundedReceiver<io::Result<Bytes>>>>,
}

/// Test side of a [`ChannelTransport`].
pub struct BodyFeed {
    tx: mpsc::UnboundedSender<io::Result<Bytes>>,
}

impl BodyFeed {
    /// Deliver one chunk. Returns false once the session dropped the body.
    pub fn send(&self, chunk: &[u8]) -> bool {
        self.tx
            .unbounded_send(Ok(Bytes::copy_from_slice(chunk)))
            .is_ok()
    }

    /// End the body normally.
    pub fn finish(self) {
        self.tx.close_channel();
    }

    /// Whether the session dropped (aborted) the body.
    pub fn is_aborted(&self) -> bool {
        self.tx.is_closed()
    }
}

impl ChannelTransport {
    pub fn new(status: u16) -> (Self, BodyFeed) {
        let (tx, rx) = mpsc::unbounded();
        (
            Self {
                status,
                body: Mutex::new(Some(rx)),
            },
            BodyFeed { tx },
        )
    }
}

impl Transport for ChannelTransport {
    fn send(&self, _request: SignedRequest) -> BoxFuture<'static, userstream::Result<TransportResponse>> {
        let status = self.status;
        let body = self.body.lock().unwrap().take();

        Box::pin(async move {
            let body = body.ok_or_else(|| StreamError::Http("already sent".to_string()))?;
            Ok(TransportResponse::new(status, body))
        })
    }
}

/// Let the session task run until it is idle.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
}
