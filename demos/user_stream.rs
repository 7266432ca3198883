//! User stream - print every event from a single-account stream.
//!
//! Signing is external: this demo sends a pre-computed `Authorization`
//! header taken from the environment.
//!
//! ```text
//! STREAM_AUTHORIZATION='OAuth oauth_consumer_key="...", ...' \
//! STREAM_URL=http://127.0.0.1:8080/user.json \
//! RUST_LOG=userstream=debug \
//! cargo run --example user_stream
//! ```
//!
//! The session never reconnects by itself, so this loop does, with a
//! doubling delay after each failed attempt. The delay starts over once
//! an attempt gets connected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use userstream::auth::SignedRequest;
use userstream::codec::JsonCodec;
use userstream::request::UnsignedRequest;
use userstream::{SessionBuilder, StreamParams, TokenPair};

const INITIAL_BACKOFF: Duration = Duration::from_secs(5);
const MAX_BACKOFF: Duration = Duration::from_secs(320);

#[derive(Debug, Deserialize)]
struct Status {
    id: u64,
    #[serde(default)]
    text: String,
}

fn header_signer(
    authorization: String,
) -> impl Fn(&UnsignedRequest, &TokenPair) -> userstream::Result<SignedRequest> + Send + Sync + 'static
{
    move |request: &UnsignedRequest, _tokens: &TokenPair| -> userstream::Result<SignedRequest> {
        Ok(SignedRequest::from_unsigned(request).header("Authorization", authorization.clone()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let authorization = std::env::var("STREAM_AUTHORIZATION")?;
    let tokens = TokenPair::new(
        std::env::var("ACCESS_TOKEN_KEY").unwrap_or_default(),
        std::env::var("ACCESS_TOKEN_SECRET").unwrap_or_default(),
    );

    let mut backoff = INITIAL_BACKOFF;

    loop {
        let mut params = StreamParams::new().with("with", "followings");
        if let Ok(url) = std::env::var("STREAM_URL") {
            params.insert("url", url);
        }

        let connected = Arc::new(AtomicBool::new(false));
        let on_connected = connected.clone();

        let session = SessionBuilder::new()
            .authenticator(header_signer(authorization.clone()))
            .on_connected(move || {
                on_connected.store(true, Ordering::SeqCst);
                println!("connected");
            })
            .on_data(|value| match JsonCodec::from_value::<Status>(value.clone()) {
                Ok(status) => println!("status {}: {}", status.id, status.text),
                Err(_) => println!("data: {}", value),
            })
            .on_garbage(|raw| println!("garbage: {} bytes", raw.len()))
            .on_heartbeat(|| println!("heartbeat"))
            .on_error(|err| println!("error: {}", err))
            .on_close(|reason| println!("close: {}", reason))
            .stream(tokens.clone(), params)?;

        let canceller = session.canceller();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                canceller.cancel();
                return Ok(());
            }
            _ = session.wait_for_close() => {}
        }

        if connected.load(Ordering::SeqCst) {
            backoff = INITIAL_BACKOFF;
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}
