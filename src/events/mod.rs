//! Events module - the public event surface and its subscriber registry.
//!
//! Provides:
//! - [`StreamEvent`] - everything a session can report
//! - [`ErrorEvent`] / [`CloseReason`] - terminal outcomes
//! - [`EventHandlers`] - typed callback lists per event kind
//!
//! # Example
//!
//! ```
//! use userstream::events::{EventHandlers, StreamEvent};
//! use serde_json::json;
//!
//! let mut handlers = EventHandlers::new();
//! handlers.on_data(|value| println!("status: {}", value));
//! handlers.on_heartbeat(|| println!("still alive"));
//!
//! handlers.dispatch(&StreamEvent::Data(json!({"id": 1})));
//! ```

mod registry;
mod types;

pub use registry::EventHandlers;
pub use types::{CloseReason, ErrorEvent, StreamEvent};
