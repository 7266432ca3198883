//! Subscriber registry for session events.
//!
//! Each event kind has its own list of callbacks. Callbacks run
//! synchronously on the session task, in registration order, so they
//! should hand heavy work off (e.g. through a channel) rather than block.

use bytes::Bytes;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::{CloseReason, ErrorEvent, StreamEvent};

type Callback0 = Box<dyn Fn() + Send + Sync>;
type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Typed callback lists, one per event kind.
#[derive(Default)]
pub struct EventHandlers {
    connected: Vec<Callback0>,
    data: Vec<Callback<Value>>,
    garbage: Vec<Callback<Bytes>>,
    heartbeat: Vec<Callback0>,
    error: Vec<Callback<ErrorEvent>>,
    close: Vec<Callback<CloseReason>>,
    any: Vec<Callback<StreamEvent>>,
}

impl EventHandlers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once when response headers arrive with a success status.
    pub fn on_connected<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.connected.push(Box::new(f));
        self
    }

    /// Called for every frame that decoded as JSON.
    pub fn on_data<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.data.push(Box::new(f));
        self
    }

    /// Called for every frame that failed to parse.
    pub fn on_garbage<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Bytes) + Send + Sync + 'static,
    {
        self.garbage.push(Box::new(f));
        self
    }

    /// Called for every heartbeat.
    pub fn on_heartbeat<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.heartbeat.push(Box::new(f));
        self
    }

    /// Called on request or response failure.
    pub fn on_error<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        self.error.push(Box::new(f));
        self
    }

    /// Called once when a streaming connection ends.
    pub fn on_close<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&CloseReason) + Send + Sync + 'static,
    {
        self.close.push(Box::new(f));
        self
    }

    /// Called for every event, after the kind-specific callbacks.
    pub fn on_event<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&StreamEvent) + Send + Sync + 'static,
    {
        self.any.push(Box::new(f));
        self
    }

    /// Deliver `event` to its subscribers.
    pub fn dispatch(&self, event: &StreamEvent) {
        self.deliver(event, &CancellationToken::new());
    }

    /// Deliver `event`, stopping between subscribers once `cancel` fires.
    ///
    /// Terminal events (`error`, `close`) always reach every subscriber.
    /// For the others, cancellation is checked before each callback, so a
    /// cancel issued from one subscriber (or another thread) keeps the
    /// event away from every subscriber not yet invoked.
    pub fn dispatch_until_cancelled(&self, event: &StreamEvent, cancel: &CancellationToken) {
        if event.is_terminal() {
            self.deliver(event, &CancellationToken::new());
        } else {
            self.deliver(event, cancel);
        }
    }

    fn deliver(&self, event: &StreamEvent, cancel: &CancellationToken) {
        let live = || !cancel.is_cancelled();

        match event {
            StreamEvent::Connected => {
                for f in self.connected.iter().take_while(|_| live()) {
                    f();
                }
            }
            StreamEvent::Data(value) => {
                for f in self.data.iter().take_while(|_| live()) {
                    f(value);
                }
            }
            StreamEvent::Garbage(raw) => {
                for f in self.garbage.iter().take_while(|_| live()) {
                    f(raw);
                }
            }
            StreamEvent::Heartbeat => {
                for f in self.heartbeat.iter().take_while(|_| live()) {
                    f();
                }
            }
            StreamEvent::Error(err) => self.error.iter().for_each(|f| f(err)),
            StreamEvent::Close(reason) => self.close.iter().for_each(|f| f(reason)),
        }

        for f in self.any.iter().take_while(|_| live()) {
            f(event);
        }
    }

    /// Total number of registered callbacks.
    pub fn len(&self) -> usize {
        self.connected.len()
            + self.data.len()
            + self.garbage.len()
            + self.heartbeat.len()
            + self.error.len()
            + self.close.len()
            + self.any.len()
    }

    /// Check if no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlers")
            .field("connected", &self.connected.len())
            .field("data", &self.data.len())
            .field("garbage", &self.garbage.len())
            .field("heartbeat", &self.heartbeat.len())
            .field("error", &self.error.len())
            .field("close", &self.close.len())
            .field("any", &self.any.len())
            .finish()
    }
}
