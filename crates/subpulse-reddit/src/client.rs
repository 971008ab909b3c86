//! HTTP client for the Reddit OAuth API.
//!
//! Use [`RedditClient::new`] for production or [`RedditClient::with_base_urls`]
//! to point at a mock server in tests.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use subpulse_core::{
    AppConfig, ContentProvider, ProviderError, RawComment, RawItem, SortMethod, TimeFilter,
};
use tokio::sync::Mutex;

use crate::error::RedditError;
use crate::normalize::{comment_to_raw, post_to_raw_item};
use crate::retry::retry_with_backoff;
use crate::types::{CommentData, Listing, PostData, TokenResponse};

const DEFAULT_AUTH_URL: &str = "https://www.reddit.com/";
const DEFAULT_API_URL: &str = "https://oauth.reddit.com/";

/// Reddit serves at most 100 listing entries per request.
const PAGE_LIMIT: usize = 100;
/// Hard stop on pagination; Reddit listings end around 1000 entries anyway.
const MAX_PAGES: usize = 10;

/// Credentials and transport settings for [`RedditClient`].
#[derive(Clone)]
pub struct RedditClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl fmt::Debug for RedditClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditClientConfig")
            .field("client_id", &"[redacted]")
            .field("client_secret", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}

impl RedditClientConfig {
    /// Extract Reddit settings from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Config`] if `REDDIT_CLIENT_ID` or
    /// `REDDIT_CLIENT_SECRET` is not set.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, RedditError> {
        let client_id = config
            .reddit_client_id
            .clone()
            .ok_or_else(|| RedditError::Config("REDDIT_CLIENT_ID is not set".to_owned()))?;
        let client_secret = config
            .reddit_client_secret
            .clone()
            .ok_or_else(|| RedditError::Config("REDDIT_CLIENT_SECRET is not set".to_owned()))?;

        Ok(Self {
            client_id,
            client_secret,
            user_agent: config.reddit_user_agent.clone(),
            timeout_secs: config.request_timeout_secs,
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }
}

/// Reddit API client.
///
/// The access token is fetched on first use and cached for the life of the
/// client, so credential problems surface as per-source provider errors
/// rather than a startup failure. A `401` from the API drops the cached token
/// and the request is retried once with a fresh one.
pub struct RedditClient {
    client: Client,
    auth_url: Url,
    api_url: Url,
    client_id: String,
    client_secret: String,
    max_retries: u32,
    backoff_base_ms: u64,
    token: Mutex<Option<String>>,
}

impl fmt::Debug for RedditClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditClient")
            .field("auth_url", &self.auth_url.as_str())
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RedditClient {
    /// Creates a client pointed at the production Reddit endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &RedditClientConfig) -> Result<Self, RedditError> {
        Self::with_base_urls(config, DEFAULT_AUTH_URL, DEFAULT_API_URL)
    }

    /// Creates a client with custom auth and API base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`RedditError::Config`] if either URL is invalid.
    pub fn with_base_urls(
        config: &RedditClientConfig,
        auth_url: &str,
        api_url: &str,
    ) -> Result<Self, RedditError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            auth_url: parse_base_url(auth_url)?,
            api_url: parse_base_url(api_url)?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
            token: Mutex::new(None),
        })
    }

    /// Fetches one page of a subreddit listing.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError`] on auth, transport, status, or parse failure.
    async fn fetch_listing_page(
        &self,
        source: &str,
        sort: SortMethod,
        time_filter: TimeFilter,
        page_limit: usize,
        after: Option<&str>,
    ) -> Result<Listing<PostData>, RedditError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| RedditError::Config(format!("cannot-be-a-base URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(["r", source, sort.as_str()]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &page_limit.to_string());
            pairs.append_pair("raw_json", "1");
            if sort.uses_time_filter() {
                pairs.append_pair("t", time_filter.as_str());
            }
            if let Some(after) = after {
                pairs.append_pair("after", after);
            }
        }

        self.get_json(url, &format!("listing r/{source}/{sort}"))
            .await
    }

    /// Fetches up to `max` top-level comments for a post.
    ///
    /// `more` stubs are discarded; they would require a further request per
    /// stub to expand.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError`] on auth, transport, status, or parse failure.
    pub async fn fetch_top_level_comments(
        &self,
        post_id: &str,
        max: usize,
    ) -> Result<Vec<RawComment>, RedditError> {
        if max == 0 {
            return Ok(Vec::new());
        }

        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| RedditError::Config(format!("cannot-be-a-base URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(["comments", post_id]);
        url.query_pairs_mut()
            .append_pair("depth", "1")
            .append_pair("limit", &max.to_string())
            .append_pair("raw_json", "1");

        let (_post, comments): (IgnoredAny, Listing<CommentData>) =
            self.get_json(url, &format!("comments {post_id}")).await?;

        let raw: Vec<RawComment> = comments
            .data
            .children
            .into_iter()
            .filter(|thing| thing.kind == "t1")
            .take(max)
            .map(|thing| comment_to_raw(thing.data))
            .collect();

        tracing::debug!(post_id, comments = raw.len(), "fetched top-level comments");
        Ok(raw)
    }

    /// GET + parse with retries, refreshing the token once on `401`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, RedditError> {
        let result = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.get_json_once(url.clone(), context)
        })
        .await;

        match result {
            Err(RedditError::Status { status: 401, .. }) => {
                tracing::debug!(context, "access token rejected, refreshing");
                retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                    self.get_json_once(url.clone(), context)
                })
                .await
            }
            other => other,
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, RedditError> {
        let token = self.bearer_token().await?;
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url).bearer_auth(&token).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_token(&token).await;
        }
        if !status.is_success() {
            return Err(RedditError::Status {
                status: status.as_u16(),
                context: context.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RedditError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Returns the cached access token, fetching one if none is cached.
    ///
    /// The lock is held across the exchange so concurrent sources share one
    /// token request.
    async fn bearer_token(&self) -> Result<String, RedditError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }

        let token = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_token()
        })
        .await?;
        *guard = Some(token.clone());
        Ok(token)
    }

    async fn invalidate_token(&self, rejected: &str) {
        let mut guard = self.token.lock().await;
        if guard.as_deref() == Some(rejected) {
            *guard = None;
        }
    }

    async fn fetch_token(&self) -> Result<String, RedditError> {
        let mut url = self.auth_url.clone();
        url.path_segments_mut()
            .map_err(|()| RedditError::Config(format!("cannot-be-a-base URL: {}", self.auth_url)))?
            .pop_if_empty()
            .extend(["api", "v1", "access_token"]);

        let response = self
            .client
            .post(url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(RedditError::Status {
                status: status.as_u16(),
                context: "token exchange".to_owned(),
            });
        }
        if !status.is_success() {
            return Err(RedditError::Auth(format!(
                "token exchange failed with status {status}"
            )));
        }

        let body = response.text().await?;
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| RedditError::Deserialize {
                context: "token exchange".to_owned(),
                source: e,
            })?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                tracing::debug!("obtained Reddit access token");
                Ok(token)
            }
            _ => Err(RedditError::Auth(
                parsed
                    .error
                    .unwrap_or_else(|| "response carried no access_token".to_owned()),
            )),
        }
    }
}

/// Pagination cursor threaded through [`stream::try_unfold`].
struct PageCursor {
    after: Option<String>,
    remaining: usize,
    pages: usize,
    exhausted: bool,
}

#[async_trait]
impl ContentProvider for RedditClient {
    fn list_items<'a>(
        &'a self,
        source: &'a str,
        sort: SortMethod,
        time_filter: TimeFilter,
        limit: usize,
    ) -> BoxStream<'a, Result<RawItem, ProviderError>> {
        let start = PageCursor {
            after: None,
            remaining: limit,
            pages: 0,
            exhausted: false,
        };

        stream::try_unfold(start, move |cursor| async move {
            if cursor.exhausted || cursor.remaining == 0 || cursor.pages >= MAX_PAGES {
                return Ok::<_, ProviderError>(None);
            }

            let page_limit = cursor.remaining.min(PAGE_LIMIT);
            let listing = self
                .fetch_listing_page(source, sort, time_filter, page_limit, cursor.after.as_deref())
                .await
                .map_err(ProviderError::from)?;

            let items: Vec<Result<RawItem, ProviderError>> = listing
                .data
                .children
                .into_iter()
                .filter(|thing| thing.kind == "t3")
                .take(page_limit)
                .map(|thing| Ok(post_to_raw_item(thing.data)))
                .collect();

            tracing::debug!(
                source,
                page = cursor.pages + 1,
                items = items.len(),
                "fetched listing page"
            );

            let next = PageCursor {
                exhausted: listing.data.after.is_none() || items.is_empty(),
                remaining: cursor.remaining.saturating_sub(items.len()),
                after: listing.data.after,
                pages: cursor.pages + 1,
            };
            Ok(Some((stream::iter(items), next)))
        })
        .try_flatten()
        .boxed()
    }

    async fn list_top_level_comments(
        &self,
        item_id: &str,
        max: usize,
    ) -> Result<Vec<RawComment>, ProviderError> {
        self.fetch_top_level_comments(item_id, max)
            .await
            .map_err(ProviderError::from)
    }
}

/// Normalise a base URL so it ends with exactly one slash.
fn parse_base_url(raw: &str) -> Result<Url, RedditError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| RedditError::Config(format!("invalid base URL '{raw}': {e}")))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
