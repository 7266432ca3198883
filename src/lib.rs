//! # userstream
//!
//! Client for long-lived, server-pushed HTTP streams that multiplex
//! heartbeats and length-delimited JSON frames over one chunked body
//! (user streams and site streams).
//!
//! ## Architecture
//!
//! - **Decoder** ([`protocol::FrameDecoder`]): pure state machine turning
//!   arbitrary byte chunks into heartbeats, frames and garbage
//! - **Session** ([`StreamSession`]): sends one signed request, feeds the
//!   body through a decoder, and emits `connected`, `data`, `garbage`,
//!   `heartbeat`, `error` and `close` events
//!
//! Signing is delegated to a caller-supplied [`auth::Authenticator`];
//! reconnecting after `close` or `error` is left to the caller.
//!
//! ## Example
//!
//! ```ignore
//! use userstream::{SessionBuilder, StreamParams, TokenPair};
//!
//! #[tokio::main]
//! async fn main() -> userstream::Result<()> {
//!     let session = SessionBuilder::new()
//!         .authenticator(my_signer)
//!         .on_data(|status| println!("{}", status))
//!         .on_heartbeat(|| println!("heartbeat"))
//!         .on_close(|reason| println!("closed: {}", reason))
//!         .stream(TokenPair::new("token", "secret"), StreamParams::new())?;
//!
//!     session.wait_for_close().await
//! }
//! ```

pub mod auth;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod protocol;
pub mod request;
pub mod transport;

mod session;

pub use config::SessionConfig;
pub use error::{DecodeError, Result, StreamError};
pub use events::{CloseReason, ErrorEvent, StreamEvent};
pub use request::{Endpoint, StreamParams, TokenPair};
pub use session::{Canceller, SessionBuilder, SessionState, StreamSession};
