//! Following public and private accounts.

mod common;

use common::mock_backend::{MockBackend, MockResponse};
use common::{client_for, drain, user_json, ME};
use feedline::notice::NoticeLevel;
use feedline::FeedlineClient;
use serde_json::json;

const FOLLOW: &str = "/api/Follow/follow";
const UNFOLLOW: &str = "/api/Follow/unfollow";

async fn load_user(backend: &MockBackend, client: &FeedlineClient, id: &str, private: bool) {
    backend
        .route(
            &format!("/api/User/get-user/{}", id),
            MockResponse::data(user_json(id, private)),
        )
        .await;
    client.profile().load(id).await.unwrap();
}

#[tokio::test]
async fn test_public_follow_moves_both_counters() {
    let backend = MockBackend::start().await;
    let (client, _notices) = client_for(&backend);
    load_user(&backend, &client, ME, false).await;
    load_user(&backend, &client, "carol", false).await;

    client.follows().follow("carol").await.unwrap();

    let carol = client.profile().get("carol").unwrap();
    assert!(carol.is_follower);
    assert!(carol.is_follower_accepted);
    assert_eq!(carol.followers_count, 11);
    assert_eq!(client.profile().get(ME).unwrap().following_count, 6);

    let requests = backend.requests_to(FOLLOW).await;
    assert_eq!(
        requests[0].json(),
        json!({"followerId": ME, "targetUserId": "carol"})
    );
}

#[tokio::test]
async fn test_following_twice_counts_once() {
    let backend = MockBackend::start().await;
    let (client, _notices) = client_for(&backend);
    load_user(&backend, &client, ME, false).await;
    load_user(&backend, &client, "carol", false).await;

    client.follows().follow("carol").await.unwrap();
    client.follows().follow("carol").await.unwrap();

    assert_eq!(client.profile().get("carol").unwrap().followers_count, 11);
    assert_eq!(client.profile().get(ME).unwrap().following_count, 6);
    assert_eq!(backend.requests_to(FOLLOW).await.len(), 1);
}

#[tokio::test]
async fn test_repeat_request_to_private_account_is_ignored() {
    let backend = MockBackend::start().await;
    let (client, _notices) = client_for(&backend);
    load_user(&backend, &client, ME, false).await;
    load_user(&backend, &client, "bob", true).await;

    client.follows().follow("bob").await.unwrap();
    client.follows().follow("bob").await.unwrap();

    let bob = client.profile().get("bob").unwrap();
    assert!(bob.is_follower);
    assert!(!bob.is_follower_accepted);
    assert_eq!(bob.followers_count, 10);
    assert_eq!(backend.requests_to(FOLLOW).await.len(), 1);
}

#[tokio::test]
async fn test_private_follow_is_pending_until_accepted() {
    let backend = MockBackend::start().await;
    let (client, _notices) = client_for(&backend);
    load_user(&backend, &client, ME, false).await;
    load_user(&backend, &client, "bob", true).await;

    client.follows().follow("bob").await.unwrap();

    let bob = client.profile().get("bob").unwrap();
    assert!(bob.is_follower);
    assert!(!bob.is_follower_accepted);
    assert_eq!(bob.followers_count, 10);
    assert_eq!(client.profile().get(ME).unwrap().following_count, 5);

    client.follows().apply_accepted("bob").await;

    let bob = client.profile().get("bob").unwrap();
    assert!(bob.is_follower_accepted);
    assert_eq!(bob.followers_count, 11);
    assert_eq!(client.profile().get(ME).unwrap().following_count, 6);

    // A second acceptance event changes nothing.
    client.follows().apply_accepted("bob").await;
    assert_eq!(client.profile().get("bob").unwrap().followers_count, 11);
}

#[tokio::test]
async fn test_withdrawing_pending_request_leaves_counters() {
    let backend = MockBackend::start().await;
    let (client, _notices) = client_for(&backend);
    load_user(&backend, &client, ME, false).await;
    load_user(&backend, &client, "bob", true).await;

    client.follows().follow("bob").await.unwrap();
    client.follows().unfollow("bob").await.unwrap();

    let bob = client.profile().get("bob").unwrap();
    assert!(!bob.is_follower);
    assert!(!bob.is_follower_accepted);
    assert_eq!(bob.followers_count, 10);
    assert_eq!(client.profile().get(ME).unwrap().following_count, 5);
    assert_eq!(backend.requests_to(UNFOLLOW).await.len(), 1);
}

#[tokio::test]
async fn test_rejected_follow_rolls_back() {
    let backend = MockBackend::start().await;
    let (client, mut notices) = client_for(&backend);
    load_user(&backend, &client, ME, false).await;
    load_user(&backend, &client, "carol", false).await;
    backend.route(FOLLOW, MockResponse::failure("Already following")).await;

    let err = client.follows().follow("carol").await.unwrap_err();
    assert!(err.detail().contains("Already following"));

    let carol = client.profile().get("carol").unwrap();
    assert!(!carol.is_follower);
    assert_eq!(carol.followers_count, 10);
    assert_eq!(client.profile().get(ME).unwrap().following_count, 5);

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Follow failed");
}

#[tokio::test]
async fn test_accepting_request_drops_it_from_pending() {
    let backend = MockBackend::start().await;
    let (client, mut notices) = client_for(&backend);
    load_user(&backend, &client, ME, false).await;
    backend
        .route(
            "/api/Follow/pending-follow-requests",
            MockResponse::data(json!([
                {"id": "f1", "followerId": "u5", "followingId": ME, "accepted": false},
                {"id": "f2", "followerId": "u6", "followingId": ME, "accepted": false}
            ])),
        )
        .await;
    client.follows().load_pending().await.unwrap();
    assert_eq!(client.follows().pending().len(), 2);

    client.follows().accept_request("u5").await.unwrap();

    let pending: Vec<String> = client.follows().pending().into_iter().map(|f| f.id).collect();
    assert_eq!(pending, vec!["f2"]);
    assert_eq!(client.profile().get(ME).unwrap().followers_count, 11);

    let body = backend.requests_to("/api/Follow/accept-follow-request").await[0].json();
    assert_eq!(body, json!({"followerId": "u5", "targetUserId": ME}));

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_follow_requires_signed_in_user() {
    let backend = MockBackend::start().await;
    let (client, _notices) = client_for(&backend);
    load_user(&backend, &client, "carol", false).await;
    client.session().clear();

    let err = client.follows().follow("carol").await.unwrap_err();
    assert!(matches!(err, feedline::ClientError::NotSignedIn));
    assert!(backend.requests_to(FOLLOW).await.is_empty());
}
