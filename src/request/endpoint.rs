//! Endpoint selection and request assembly.

use std::fmt;

use super::params::{
    StreamParams, DELIMITED_KEY, DELIMITED_VALUE, FOLLOW_KEY, STALL_WARNINGS_KEY,
    STALL_WARNINGS_VALUE, URL_KEY,
};
use crate::config::SessionConfig;
use crate::error::{Result, StreamError};

/// HTTP method used for every stream request.
pub const STREAM_METHOD: &str = "POST";

/// Which streaming endpoint to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Single-account stream.
    User,
    /// Multi-account stream following the given user identifiers.
    Site { follow: Vec<String> },
}

impl Endpoint {
    /// Site stream following `user_ids`.
    pub fn site<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Endpoint::Site {
            follow: user_ids.into_iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Configured address for this endpoint.
    pub fn default_url<'a>(&self, config: &'a SessionConfig) -> &'a str {
        match self {
            Endpoint::User => &config.user_stream_url,
            Endpoint::Site { .. } => &config.site_stream_url,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::User => "user",
            Endpoint::Site { .. } => "site",
        }
    }
}

/// Access token credentials held by the caller and handed to the authenticator.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Access token.
    pub key: String,
    /// Access token secret.
    pub secret: String,
}

impl TokenPair {
    /// Create a token pair.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A fully parameterised request that still needs signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedRequest {
    /// HTTP method.
    pub method: &'static str,
    /// Target address, after any `url` override.
    pub url: String,
    /// Parameters to sign and send.
    pub params: StreamParams,
}

/// Merge caller parameters with the mandatory ones for `endpoint`.
///
/// Order of precedence, lowest first: caller parameters, `follow` (site
/// streams only), then `delimited=length` and `stall_warnings=true`. A
/// caller `url` entry replaces the endpoint address and is not sent.
///
/// # Errors
///
/// Returns [`StreamError::InvalidParams`] for a site stream with nobody to
/// follow, or when the resulting address is not an absolute URL.
pub fn build_request(
    endpoint: &Endpoint,
    mut params: StreamParams,
    config: &SessionConfig,
) -> Result<UnsignedRequest> {
    let url = params
        .remove(URL_KEY)
        .unwrap_or_else(|| endpoint.default_url(config).to_string());

    reqwest::Url::parse(&url)
        .map_err(|e| StreamError::InvalidParams(format!("bad endpoint url {url:?}: {e}")))?;

    if let Endpoint::Site { follow } = endpoint {
        if follow.is_empty() {
            return Err(StreamError::InvalidParams(
                "site stream requires at least one user id to follow".to_string(),
            ));
        }
        params.insert(FOLLOW_KEY, follow.join(","));
    }

    params.insert(DELIMITED_KEY, DELIMITED_VALUE);
    params.insert(STALL_WARNINGS_KEY, STALL_WARNINGS_VALUE);

    Ok(UnsignedRequest {
        method: STREAM_METHOD,
        url,
        params,
    })
}
