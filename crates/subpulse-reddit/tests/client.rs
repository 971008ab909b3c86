//! Wiremock-backed tests for the Reddit provider.

use futures::StreamExt;
use serde_json::{json, Value};
use subpulse_core::{ContentProvider, RawItem, SortMethod, TimeFilter};
use subpulse_reddit::{RedditClient, RedditClientConfig};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config(max_retries: u32) -> RedditClientConfig {
    RedditClientConfig {
        client_id: "id".to_owned(),
        client_secret: "secret".to_owned(),
        user_agent: "subpulse-test/0.1".to_owned(),
        timeout_secs: 5,
        max_retries,
        backoff_base_ms: 0,
    }
}

fn client(server: &MockServer, max_retries: u32) -> RedditClient {
    RedditClient::with_base_urls(&config(max_retries), &server.uri(), &server.uri())
        .expect("client construction should not fail")
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 86400
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn post(id: &str) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "title": format!("Post {id}"),
            "score": 12,
            "num_comments": 3,
            "upvote_ratio": 0.93,
            "url": format!("https://example.com/{id}"),
            "author": "alice",
            "created_utc": 1_700_000_000.0,
            "selftext": ""
        }
    })
}

fn listing(children: &[Value], after: Option<&str>) -> Value {
    json!({ "kind": "Listing", "data": { "children": children, "after": after } })
}

async fn collect_items(
    client: &RedditClient,
    source: &str,
    sort: SortMethod,
    limit: usize,
) -> Vec<Result<RawItem, subpulse_core::ProviderError>> {
    client
        .list_items(source, sort, TimeFilter::Week, limit)
        .collect()
        .await
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_items_follows_after_cursor_across_pages() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/r/rust/hot"))
        .and(query_param("after", "t3_b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[post("c")], None)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/rust/hot"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing(&[post("a"), post("b")], Some("t3_b"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let items = collect_items(&client(&server, 0), "rust", SortMethod::Hot, 10).await;
    let ids: Vec<String> = items.into_iter().map(|r| r.unwrap().id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn list_items_never_exceeds_limit() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/r/rust/new"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            &[post("a"), post("b"), post("c")],
            Some("t3_c"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let items = collect_items(&client(&server, 0), "rust", SortMethod::New, 2).await;
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn top_sort_sends_time_filter() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/r/rust/top"))
        .and(query_param("t", "week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[post("a")], None)))
        .expect(1)
        .mount(&server)
        .await;

    let items = collect_items(&client(&server, 0), "rust", SortMethod::Top, 5).await;
    assert_eq!(items.len(), 1);
    let item = items.into_iter().next().unwrap().unwrap();
    assert_eq!(item.title.as_deref(), Some("Post a"));
    assert_eq!(item.upvote_ratio, Some(0.93));
    assert_eq!(item.created_utc, Some(1_700_000_000.0));
}

#[tokio::test]
async fn zero_limit_makes_no_requests() {
    let server = MockServer::start().await;
    mount_token(&server, 0).await;

    let items = collect_items(&client(&server, 0), "rust", SortMethod::Hot, 0).await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn client_error_yields_single_err_and_ends_stream() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/r/private/hot"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let items = collect_items(&client(&server, 3), "private", SortMethod::Hot, 10).await;
    assert_eq!(items.len(), 1);
    let err = items.into_iter().next().unwrap().unwrap_err();
    assert!(err.message.contains("403"), "got: {}", err.message);
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/r/rust/hot"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/rust/hot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[post("a")], None)))
        .expect(1)
        .mount(&server)
        .await;

    let items = collect_items(&client(&server, 2), "rust", SortMethod::Hot, 5).await;
    assert_eq!(items.len(), 1);
    assert!(items[0].is_ok());
}

#[tokio::test]
async fn rejected_credentials_surface_as_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let items = collect_items(&client(&server, 3), "rust", SortMethod::Hot, 5).await;
    assert_eq!(items.len(), 1);
    let err = items.into_iter().next().unwrap().unwrap_err();
    assert!(err.message.contains("auth"), "got: {}", err.message);
}

#[tokio::test]
async fn expired_token_is_refreshed_once() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/r/rust/hot"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/rust/hot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[post("a")], None)))
        .mount(&server)
        .await;

    let items = collect_items(&client(&server, 0), "rust", SortMethod::Hot, 5).await;
    assert_eq!(items.len(), 1);
    assert!(items[0].is_ok());
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn comments_keep_only_top_level_t1_children() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let body = json!([
        listing(&[post("abc")], None),
        {
            "kind": "Listing",
            "data": {
                "children": [
                    { "kind": "t1", "data": { "id": "c1", "author": "bob", "body": "great post", "score": 5, "created_utc": 1_700_000_100.0 } },
                    { "kind": "t1", "data": { "id": "c2", "author": null, "body": "[deleted]", "score": 0, "created_utc": 1_700_000_200.0 } },
                    { "kind": "more", "data": { "id": "c3", "count": 12, "children": ["c4", "c5"] } }
                ],
                "after": null
            }
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/comments/abc"))
        .and(query_param("depth", "1"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let comments = client(&server, 0)
        .list_top_level_comments("abc", 5)
        .await
        .unwrap();
    let ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
    assert_eq!(comments[0].body.as_deref(), Some("great post"));
    assert!(comments[1].author.is_none());
}

#[tokio::test]
async fn token_is_shared_between_listing_and_comments() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/r/rust/hot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[post("a")], None)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/comments/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing(&[post("a")], None),
            listing(&[], None)
        ])))
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let items = collect_items(&client, "rust", SortMethod::Hot, 5).await;
    assert_eq!(items.len(), 1);
    let comments = client.list_top_level_comments("a", 10).await.unwrap();
    assert!(comments.is_empty());
}

#[tokio::test]
async fn comment_endpoint_failure_maps_to_provider_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/comments/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server, 0)
        .list_top_level_comments("gone", 5)
        .await
        .unwrap_err();
    assert!(err.message.contains("404"), "got: {}", err.message);
}
