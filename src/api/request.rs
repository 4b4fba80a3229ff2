//! Request descriptors for the API endpoints
//!
//! A [`RequestDescriptor`] is a plain value naming an endpoint and its query
//! parameters. It carries no transport state, so the same descriptor can be
//! re-issued after a quota wait.

use std::fmt;

/// Query parameter carrying the continuation cursor
pub const PAGE_TOKEN_PARAM: &str = "pageToken";

/// Query parameter selecting the resource parts to return
pub const PART_PARAM: &str = "part";

/// Listing endpoints used by the harvester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `search.list`: video IDs matching a keyword or channel
    Search,
    /// `videos.list`: snippet and statistics for up to 50 IDs
    Videos,
    /// `commentThreads.list`: top-level comments on one video
    CommentThreads,
    /// `channels.list`: channel statistics by username
    Channels,
}

impl Endpoint {
    /// Path segment appended to the API root
    pub fn path(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Videos => "videos",
            Self::CommentThreads => "commentThreads",
            Self::Channels => "channels",
        }
    }

    /// Parameters that survive into a continuation request besides `part`
    ///
    /// A search continuation is reduced to `{part, pageToken}`; the provider
    /// keeps the original filters server-side. Comment-thread and channel
    /// listings are rejected without their scoping filter, so those stay.
    fn continuation_params(&self) -> &'static [&'static str] {
        match self {
            Self::Search | Self::Videos => &[],
            Self::CommentThreads => &["videoId", "maxResults", "order"],
            Self::Channels => &["forUsername", "maxResults"],
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A single API call: endpoint plus ordered query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    endpoint: Endpoint,
    params: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Creates a descriptor with no parameters
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    /// Adds or replaces a query parameter
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
        self
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Looks up a parameter value by name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Builds the request for the page identified by `token`
    ///
    /// The result is not a copy of `self`: only `part`, the endpoint's
    /// scoping parameters and the token are kept.
    pub fn continuation(&self, token: &str) -> Self {
        let keep = self.endpoint.continuation_params();
        let params = self
            .params
            .iter()
            .filter(|(k, _)| k == PART_PARAM || keep.contains(&k.as_str()))
            .cloned()
            .collect();

        Self {
            endpoint: self.endpoint,
            params,
        }
        .param(PAGE_TOKEN_PARAM, token)
    }
}
