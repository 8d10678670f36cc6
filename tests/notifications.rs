//! Notification list, read state and deletion.

mod common;

use common::mock_backend::{MockBackend, MockResponse};
use common::{client_for, drain, notification_json};
use feedline::model::NotificationKind;
use feedline::notice::NoticeReceiver;
use feedline::store::PageOutcome;
use feedline::FeedlineClient;
use serde_json::json;

const LIST: &str = "/api/Notifications/user/me";

async fn loaded_client(backend: &MockBackend) -> (FeedlineClient, NoticeReceiver) {
    backend
        .route(
            LIST,
            MockResponse::data(json!([
                notification_json("n1", "like", false),
                notification_json("n2", "follow-request", true),
                notification_json("n3", "comment-reply", false)
            ])),
        )
        .await;
    let (client, notices) = client_for(backend);
    client.notifications().load().await.unwrap();
    (client, notices)
}

#[tokio::test]
async fn test_load_decodes_kinds_and_counts_unread() {
    let backend = MockBackend::start().await;
    let (client, _notices) = loaded_client(&backend).await;

    let list = client.notifications().notifications();
    assert_eq!(list.len(), 3);
    assert_eq!(list[1].kind, NotificationKind::FollowRequest);
    assert_eq!(list[2].kind.label(), "comment reply");
    assert_eq!(client.notifications().unread_count(), 2);
    assert!(client.notifications().state().has_more);

    let request = &backend.requests_to(LIST).await[0];
    assert_eq!(request.query.as_deref(), Some("page=1&limit=3"));
}

#[tokio::test]
async fn test_unknown_kinds_are_skipped() {
    let backend = MockBackend::start().await;
    backend
        .route(
            LIST,
            MockResponse::data(json!([
                notification_json("n1", "like", false),
                {"id": "n2", "type": "birthday", "isRead": false}
            ])),
        )
        .await;
    let (client, _notices) = client_for(&backend);

    let outcome = client.notifications().load().await.unwrap();
    assert!(matches!(outcome, PageOutcome::Applied { received: 1, .. }));
    assert_eq!(client.notifications().notifications().len(), 1);
}

#[tokio::test]
async fn test_skipped_record_does_not_end_pagination() {
    let backend = MockBackend::start().await;
    backend
        .route(
            LIST,
            MockResponse::data(json!([
                notification_json("n1", "like", false),
                {"id": "n2", "type": "birthday", "isRead": false},
                notification_json("n3", "follow", false)
            ])),
        )
        .await;
    backend
        .route(
            LIST,
            MockResponse::data(json!([notification_json("n4", "comment", true)])),
        )
        .await;
    let (client, _notices) = client_for(&backend);

    let outcome = client.notifications().load().await.unwrap();
    assert_eq!(
        outcome,
        PageOutcome::Applied {
            received: 2,
            has_more: true
        }
    );

    let outcome = client.notifications().load_more().await.unwrap();
    assert!(matches!(outcome, PageOutcome::Applied { received: 1, has_more: false }));
    let ids: Vec<String> = client
        .notifications()
        .notifications()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec!["n1", "n3", "n4"]);

    let second = &backend.requests_to(LIST).await[1];
    assert_eq!(second.query.as_deref(), Some("page=2&limit=3"));
}

#[tokio::test]
async fn test_mark_read_is_optimistic() {
    let backend = MockBackend::start().await;
    let (client, _notices) = loaded_client(&backend).await;

    client.notifications().mark_read("n1").await.unwrap();

    assert!(client.store().notification("n1").unwrap().is_read);
    assert_eq!(client.notifications().unread_count(), 1);
    let requests = backend.requests_to("/api/Notifications/n1/mark-read").await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
}

#[tokio::test]
async fn test_failed_mark_all_read_restores_each_record() {
    let backend = MockBackend::start().await;
    let (client, mut notices) = loaded_client(&backend).await;
    client.notifications().mark_read("n1").await.unwrap();
    backend
        .route(
            "/api/Notifications/user/me/mark-all-read",
            MockResponse::status(503, "try later"),
        )
        .await;

    assert!(client.notifications().mark_all_read().await.is_err());

    // n1 was read before the batch and stays read; n3 goes back to unread.
    assert!(client.store().notification("n1").unwrap().is_read);
    assert!(!client.store().notification("n3").unwrap().is_read);
    assert_eq!(client.notifications().unread_count(), 1);

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Mark all as read failed");
}

#[tokio::test]
async fn test_delete_removes_from_list() {
    let backend = MockBackend::start().await;
    let (client, _notices) = loaded_client(&backend).await;

    client.notifications().delete("n2").await.unwrap();

    let ids: Vec<String> = client
        .notifications()
        .notifications()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec!["n1", "n3"]);
    assert!(client.store().notification("n2").is_none());
}

#[tokio::test]
async fn test_delete_all_clears_both_lists() {
    let backend = MockBackend::start().await;
    let (client, _notices) = loaded_client(&backend).await;
    backend
        .route(
            "/api/Notifications/user/me/unread",
            MockResponse::data(json!([notification_json("n1", "like", false)])),
        )
        .await;
    client.notifications().load_unread().await.unwrap();
    assert_eq!(client.notifications().unread().len(), 1);

    client.notifications().delete_all().await.unwrap();

    assert!(client.notifications().notifications().is_empty());
    assert!(client.notifications().unread().is_empty());
    let delete = backend.requests_to("/api/Notifications/user/me/all").await;
    assert_eq!(delete[0].method, "DELETE");
}
