//! Search criteria and date handling

use crate::api::{Endpoint, RequestDescriptor, PART_PARAM};
use crate::harvest::ResultLimit;
use crate::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Largest page the provider serves, and the most IDs one detail lookup accepts
pub const MAX_PAGE_SIZE: u32 = 50;

/// Input format for `since` dates
const SINCE_FORMAT: &str = "%d/%m/%Y";

/// Ordering of search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Order {
    Date,
    Rating,
    Relevance,
    Title,
    VideoCount,
    #[default]
    ViewCount,
}

impl Order {
    /// Value sent in the `order` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Rating => "rating",
            Self::Relevance => "relevance",
            Self::Title => "title",
            Self::VideoCount => "videoCount",
            Self::ViewCount => "viewCount",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "rating" => Ok(Self::Rating),
            "relevance" => Ok(Self::Relevance),
            "title" => Ok(Self::Title),
            "videoCount" => Ok(Self::VideoCount),
            "viewCount" => Ok(Self::ViewCount),
            other => Err(format!(
                "unknown order '{}', expected one of date, rating, relevance, title, videoCount, viewCount",
                other
            )),
        }
    }
}

/// Parses a DD/MM/YYYY date
pub fn parse_since(date: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(date.trim(), SINCE_FORMAT)
        .map_err(|_| ConfigError::InvalidDate(date.to_string()))
}

/// Formats a date as the RFC 3339 timestamp `publishedAfter` expects
///
/// ```
/// use chrono::NaiveDate;
/// use yt_harvest::harvest::format_since;
///
/// let date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
/// assert_eq!(format_since(date), "2019-01-01T00:00:00Z");
/// ```
pub fn format_since(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00Z").to_string()
}

/// Where seed video IDs come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchSource {
    /// Free-text search
    Keyword(String),
    /// All videos uploaded by one channel
    Channel(String),
    /// IDs already known; no search call is made
    VideoIds(Vec<String>),
}

/// An immutable description of one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub source: SearchSource,
    /// Inclusive lower bound on publish date
    pub since: Option<NaiveDate>,
    pub limit: ResultLimit,
    pub page_size: u32,
    pub order: Order,
}

impl SearchCriteria {
    fn with_source(source: SearchSource) -> Self {
        Self {
            source,
            since: None,
            limit: ResultLimit::UNBOUNDED,
            page_size: MAX_PAGE_SIZE,
            order: Order::default(),
        }
    }

    pub fn keyword(query: impl Into<String>) -> Self {
        Self::with_source(SearchSource::Keyword(query.into()))
    }

    pub fn channel(channel_id: impl Into<String>) -> Self {
        Self::with_source(SearchSource::Channel(channel_id.into()))
    }

    pub fn video_ids(ids: Vec<String>) -> Self {
        Self::with_source(SearchSource::VideoIds(ids))
    }

    pub fn since(mut self, since: Option<NaiveDate>) -> Self {
        self.since = since;
        self
    }

    pub fn limit(mut self, limit: ResultLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the page size, clamped to `1..=MAX_PAGE_SIZE`
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Human-readable label for log lines
    pub fn label(&self) -> String {
        match &self.source {
            SearchSource::Keyword(q) => format!("keyword '{}'", q),
            SearchSource::Channel(id) => format!("channel {}", id),
            SearchSource::VideoIds(ids) => format!("{} listed videos", ids.len()),
        }
    }

    /// Builds the initial `search` request
    ///
    /// Returns `None` for [`SearchSource::VideoIds`], which needs no search.
    pub fn to_request(&self) -> Option<RequestDescriptor> {
        let request = RequestDescriptor::new(Endpoint::Search)
            .param(PART_PARAM, "id")
            .param("maxResults", self.page_size.to_string())
            .param("order", self.order.as_str())
            .param("type", "video");

        let request = match &self.source {
            SearchSource::Keyword(q) => request.param("q", q.as_str()),
            SearchSource::Channel(id) => request.param("channelId", id.as_str()),
            SearchSource::VideoIds(_) => return None,
        };

        Some(match self.since {
            Some(date) => request.param("publishedAfter", format_since(date)),
            None => request,
        })
    }
}
