use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Remote REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API (e.g., "https://social.example.com").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Total request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

/// Page sizes per list kind.
///
/// `has_more` is derived from these: a page shorter than its configured
/// size ends the list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PagingConfig {
    #[serde(default = "default_small_page")]
    pub feed: u32,
    #[serde(default = "default_small_page")]
    pub comments: u32,
    #[serde(default = "default_small_page")]
    pub notifications: u32,
    #[serde(default = "default_small_page")]
    pub search: u32,
    #[serde(default = "default_large_page")]
    pub profile_posts: u32,
    #[serde(default = "default_large_page")]
    pub follows: u32,
}

/// Where the session tokens are persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Explicit token file. Falls back to the platform data dir.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

impl SessionConfig {
    /// Resolved token file location.
    pub fn resolved_token_path(&self) -> PathBuf {
        self.token_path.clone().unwrap_or_else(|| {
            let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            data_dir.join("feedline").join("session.json")
        })
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_small_page() -> u32 {
    10
}

fn default_large_page() -> u32 {
    20
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            feed: default_small_page(),
            comments: default_small_page(),
            notifications: default_small_page(),
            search: default_small_page(),
            profile_posts: default_large_page(),
            follows: default_large_page(),
        }
    }
}
