use subpulse_core::ProviderError;
use thiserror::Error;

/// Errors returned by the Reddit API client.
#[derive(Debug, Error)]
pub enum RedditError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reddit answered with a non-2xx status.
    #[error("Reddit returned HTTP {status} for {context}")]
    Status { status: u16, context: String },

    /// The OAuth token exchange was rejected or returned no token.
    #[error("Reddit auth failed: {0}")]
    Auth(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Client construction failed (missing credentials, bad base URL).
    #[error("Reddit client configuration error: {0}")]
    Config(String),
}

impl From<RedditError> for ProviderError {
    fn from(err: RedditError) -> Self {
        ProviderError::new(err.to_string())
    }
}
