//! Reddit implementation of [`subpulse_core::ContentProvider`].
//!
//! Authenticates with the client-credentials OAuth flow, pages through
//! subreddit listings with the `after` cursor, and fetches top-level comments.

pub mod client;
pub mod error;
mod normalize;
mod retry;
mod types;

pub use client::{RedditClient, RedditClientConfig};
pub use error::RedditError;
