//! Site stream - follow several accounts over one connection.
//!
//! ```text
//! STREAM_AUTHORIZATION='OAuth ...' cargo run --example site_stream -- 12 34 56
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use userstream::auth::SignedRequest;
use userstream::request::UnsignedRequest;
use userstream::{CloseReason, SessionBuilder, StreamParams, TokenPair};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let authorization = std::env::var("STREAM_AUTHORIZATION")?;
    let user_ids: Vec<String> = std::env::args().skip(1).collect();

    let frames = Arc::new(AtomicUsize::new(0));
    let counter = frames.clone();

    let session = SessionBuilder::new()
        .authenticator(
            move |request: &UnsignedRequest, _: &TokenPair| -> userstream::Result<SignedRequest> {
                Ok(SignedRequest::from_unsigned(request)
                    .header("Authorization", authorization.clone()))
            },
        )
        .on_data(move |message| {
            let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
            let for_user = message.get("for_user").cloned().unwrap_or_default();
            println!("#{} for {}: {}", n, for_user, message);
        })
        .on_error(|err| eprintln!("error: {}", err))
        .on_close(|reason| {
            if let CloseReason::Malformed(e) = reason {
                eprintln!("stream misaligned: {}", e);
            }
        })
        .site_stream(TokenPair::new("", ""), user_ids, StreamParams::new())?;

    session.wait_for_close().await?;
    println!("received {} frames", frames.load(Ordering::Relaxed));

    Ok(())
}
