use crate::harvest::Order;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Default API root for the YouTube Data API v3
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Main configuration structure for yt-harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// API access configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Developer key sent with every request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Root URL the endpoint names are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Minutes to sleep before retrying a request that hit the daily quota
    #[serde(default = "default_quota_wait_minutes")]
    pub quota_wait_minutes: u64,

    /// Results per page, and the number of IDs per detail lookup
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Search behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Do not return videos published before this date (DD/MM/YYYY)
    #[serde(default = "default_since")]
    pub since: String,

    /// Ordering requested from the search endpoint
    #[serde(default)]
    pub order: Order,

    /// Maximum number of IDs to collect per search; absent means unbounded
    #[serde(default)]
    pub limit: Option<usize>,

    /// Maximum number of comments to collect per video; absent means unbounded
    #[serde(default)]
    pub comment_limit: Option<usize>,

    /// Request the statistics part on detail lookups
    #[serde(default = "default_fetch_statistics")]
    pub fetch_statistics: bool,
}

/// Output table configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// CSV table receiving video records
    #[serde(default = "default_video_path")]
    pub video_path: String,

    /// CSV table receiving comment records
    #[serde(default = "default_comment_path")]
    pub comment_path: String,

    /// CSV table receiving channel records
    #[serde(default = "default_channel_path")]
    pub channel_path: String,

    /// Constant columns appended to every written row
    #[serde(default)]
    pub extra_columns: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            quota_wait_minutes: default_quota_wait_minutes(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            since: default_since(),
            order: Order::default(),
            limit: None,
            comment_limit: None,
            fetch_statistics: default_fetch_statistics(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            video_path: default_video_path(),
            comment_path: default_comment_path(),
            channel_path: default_channel_path(),
            extra_columns: BTreeMap::new(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_quota_wait_minutes() -> u64 {
    15
}

fn default_page_size() -> u32 {
    50
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_since() -> String {
    "01/01/2019".to_string()
}

fn default_fetch_statistics() -> bool {
    true
}

fn default_video_path() -> String {
    "videos.csv".to_string()
}

fn default_comment_path() -> String {
    "comments.csv".to_string()
}

fn default_channel_path() -> String {
    "channels.csv".to_string()
}
