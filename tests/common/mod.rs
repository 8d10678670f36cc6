//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::path::PathBuf;

use feedline::config::Config;
use feedline::notice::{Notice, NoticeReceiver};
use feedline::session::Session;
use feedline::FeedlineClient;
use serde_json::{json, Value};
use tempfile::TempDir;

use mock_backend::MockBackend;

pub const ME: &str = "me";

/// Config pointed at the mock server, with small pages.
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_seconds = 5;
    config.paging.feed = 3;
    config.paging.comments = 10;
    config.paging.notifications = 3;
    config.paging.search = 2;
    config
}

/// In-memory session holding tokens for the user `me`.
pub fn signed_in_session() -> Session {
    let session = Session::in_memory();
    session
        .set_tokens("access-1", "refresh-1")
        .expect("in-memory session never fails");
    session.set_user(ME);
    session
}

pub fn client_for(backend: &MockBackend) -> (FeedlineClient, NoticeReceiver) {
    FeedlineClient::new(&test_config(&backend.base_url()), signed_in_session())
        .expect("Failed to build client")
}

/// Write a config file into a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Every notice emitted so far.
pub fn drain(notices: &mut NoticeReceiver) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        out.push(notice);
    }
    out
}

// -- JSON fixtures ------------------------------------------------------------

pub fn post_json(id: &str, likes: u64, liked: bool) -> Value {
    json!({
        "id": id,
        "userId": "author",
        "user": {"id": "author", "userName": "author"},
        "content": format!("post {}", id),
        "visibility": "public",
        "likesCount": likes,
        "commentsCount": 0,
        "shareingsCount": 0,
        "isLiked": liked,
        "media": []
    })
}

pub fn posts_json(prefix: &str, range: std::ops::Range<u32>) -> Value {
    Value::Array(
        range
            .map(|n| post_json(&format!("{}{}", prefix, n), 0, false))
            .collect(),
    )
}

pub fn user_json(id: &str, private: bool) -> Value {
    json!({
        "id": id,
        "firstName": "Test",
        "lastName": id,
        "userName": id,
        "email": format!("{}@example.com", id),
        "isPrivate": private,
        "followersCount": 10,
        "followingCount": 5,
        "postsCount": 2,
        "isFollower": false,
        "isFollowerAccepted": false
    })
}

pub fn comment_json(id: &str, post_id: &str) -> Value {
    json!({
        "id": id,
        "postId": post_id,
        "userId": "author",
        "user": {"id": "author", "userName": "author"},
        "content": format!("comment {}", id),
        "repliesCount": 0
    })
}

pub fn comments_json(post_id: &str, range: std::ops::Range<u32>) -> Value {
    Value::Array(
        range
            .map(|n| comment_json(&format!("c{}", n), post_id))
            .collect(),
    )
}

pub fn notification_json(id: &str, kind: &str, read: bool) -> Value {
    json!({
        "id": id,
        "userId": ME,
        "senderUser": {"id": "u7", "userName": "grace"},
        "type": kind,
        "message": "grace did something",
        "postId": "p1",
        "isRead": read
    })
}
