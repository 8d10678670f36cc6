//! REST gateway behavior: auth header, envelope errors, token refresh.

mod common;

use common::mock_backend::{MockBackend, MockResponse};
use common::{client_for, drain, post_json, posts_json, signed_in_session, test_config};
use feedline::api::{ApiError, HttpApi};
use feedline::notice::NoticeLevel;
use feedline::store::PageOutcome;
use serde_json::json;

const FEED: &str = "/api/Posts/feed";
const REFRESH: &str = "/api/User/refresh-token";

#[tokio::test]
async fn test_requests_carry_bearer_token_and_paging() {
    let backend = MockBackend::start().await;
    backend.route(FEED, MockResponse::data(posts_json("p", 0..3))).await;
    let (client, _notices) = client_for(&backend);

    client.feed().load().await.unwrap();

    let requests = backend.requests_to(FEED).await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].header("authorization"), Some("Bearer access-1"));
    assert_eq!(requests[0].query.as_deref(), Some("Page=1&Limit=3"));
}

#[tokio::test]
async fn test_envelope_failure_becomes_error_notice() {
    let backend = MockBackend::start().await;
    backend.route(FEED, MockResponse::failure("Feed unavailable")).await;
    let (client, mut notices) = client_for(&backend);

    let err = client.feed().load().await.unwrap_err();
    assert!(err.detail().contains("Feed unavailable"));

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].title, "Loading feed failed");
}

#[tokio::test]
async fn test_field_errors_are_flattened() {
    let backend = MockBackend::start().await;
    backend
        .route(
            FEED,
            MockResponse::json(json!({
                "success": false,
                "message": "Validation failed",
                "errors": {"Limit": ["must be positive"]}
            }))
            .with_status(400),
        )
        .await;
    let (client, _notices) = client_for(&backend);

    let err = client.feed().load().await.unwrap_err();
    let detail = err.detail();
    assert!(detail.contains("Validation failed"));
    assert!(detail.contains("Limit: must be positive"));
}

#[tokio::test]
async fn test_plain_error_body_is_reported() {
    let backend = MockBackend::start().await;
    backend.route(FEED, MockResponse::status(502, "bad gateway upstream")).await;
    let (client, _notices) = client_for(&backend);

    let err = client.feed().load().await.unwrap_err();
    assert!(err.to_string().contains("bad gateway upstream"));
    assert!(!err.is_unauthorized());
}

#[tokio::test]
async fn test_unauthorized_refreshes_and_retries_once() {
    let backend = MockBackend::start().await;
    backend.route(FEED, MockResponse::status(401, "")).await;
    backend
        .route(
            REFRESH,
            MockResponse::json(json!({
                "isSuccess": true,
                "accessToken": "access-2",
                "refreshToken": "refresh-2"
            })),
        )
        .await;
    backend.route(FEED, MockResponse::data(posts_json("p", 0..2))).await;
    let (client, _notices) = client_for(&backend);

    let outcome = client.feed().load().await.unwrap();
    assert_eq!(
        outcome,
        PageOutcome::Applied {
            received: 2,
            has_more: false
        }
    );

    let feed_requests = backend.requests_to(FEED).await;
    assert_eq!(feed_requests.len(), 2);
    assert_eq!(feed_requests[1].header("authorization"), Some("Bearer access-2"));

    let refresh = backend.requests_to(REFRESH).await;
    assert_eq!(refresh.len(), 1);
    assert_eq!(refresh[0].json()["refreshToken"], "refresh-1");
    assert_eq!(client.session().access_token().unwrap().expose(), "access-2");
}

#[tokio::test]
async fn test_concurrent_rejections_share_one_refresh() {
    let backend = MockBackend::start().await;
    for id in ["p1", "p2"] {
        let path = format!("/api/Posts/{}", id);
        backend.route(&path, MockResponse::status(401, "")).await;
        backend.route(&path, MockResponse::data(post_json(id, 0, false))).await;
    }
    backend
        .route(
            REFRESH,
            MockResponse::json(json!({
                "isSuccess": true,
                "accessToken": "access-2",
                "refreshToken": "refresh-2"
            }))
            .with_delay(100),
        )
        .await;
    // A second exchange would present the rotated-out refresh token.
    backend.route(REFRESH, MockResponse::status(401, "")).await;
    let session = signed_in_session();
    let api = HttpApi::new(&test_config(&backend.base_url()).api, session.clone()).unwrap();

    let (first, second) = tokio::join!(api.get_post("p1"), api.get_post("p2"));

    assert_eq!(first.unwrap().id, "p1");
    assert_eq!(second.unwrap().id, "p2");
    assert_eq!(backend.requests_to(REFRESH).await.len(), 1);
    assert!(session.is_authenticated());
    assert_eq!(session.access_token().unwrap().expose(), "access-2");
    let retry = &backend.requests_to("/api/Posts/p2").await[1];
    assert_eq!(retry.header("authorization"), Some("Bearer access-2"));
}

#[tokio::test]
async fn test_failed_refresh_clears_session() {
    let backend = MockBackend::start().await;
    backend.route(FEED, MockResponse::status(401, "")).await;
    backend.route(REFRESH, MockResponse::status(401, "")).await;
    let (client, mut notices) = client_for(&backend);

    let err = client.feed().load().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!client.session().is_authenticated());
    assert!(client.session().user_id().is_none());
    assert_eq!(backend.requests_to(FEED).await.len(), 1);
    assert_eq!(drain(&mut notices).len(), 1);
}

#[tokio::test]
async fn test_missing_data_for_required_payload() {
    let backend = MockBackend::start().await;
    backend.route("/api/Posts/p1", MockResponse::default()).await;
    let api = HttpApi::new(&test_config(&backend.base_url()).api, signed_in_session()).unwrap();

    let err = api.get_post("p1").await.unwrap_err();
    assert!(matches!(err, ApiError::MissingData { .. }), "got {:?}", err);
}
