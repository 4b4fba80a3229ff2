//! Harvest plan: what a run should fetch

use crate::config::Config;
use crate::harvest::{Order, ResultLimit};
use crate::ConfigResult;
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::Path;

/// Seed sources and limits for one harvest run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestPlan {
    /// Video IDs given explicitly
    pub video_ids: Vec<String>,

    /// Channels whose uploads are searched
    pub channel_ids: Vec<String>,

    /// Keyword query, searched once
    pub keywords: Option<String>,

    /// Legacy usernames whose channels are looked up
    pub usernames: Vec<String>,

    pub since: Option<NaiveDate>,
    pub order: Order,

    /// Bound on IDs collected per search
    pub search_limit: ResultLimit,

    /// Bound on comments collected per video
    pub comment_limit: ResultLimit,

    pub fetch_statistics: bool,
}

impl HarvestPlan {
    /// Creates an empty plan carrying the search settings from `config`
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        Ok(Self {
            since: Some(crate::harvest::parse_since(&config.search.since)?),
            order: config.search.order,
            search_limit: config.search.limit.into(),
            comment_limit: config.search.comment_limit.into(),
            fetch_statistics: config.search.fetch_statistics,
            ..Self::default()
        })
    }

    /// Sets the keyword query from keyword lines, joined with spaces
    pub fn with_keywords(mut self, lines: &[String]) -> Self {
        self.keywords = Some(lines.join(" ")).filter(|q| !q.trim().is_empty());
        self
    }

    /// Returns true if the plan has nothing to fetch
    pub fn is_empty(&self) -> bool {
        self.video_ids.is_empty()
            && self.channel_ids.is_empty()
            && self.keywords.is_none()
            && self.usernames.is_empty()
    }
}

/// Reads a list file, one entry per line
///
/// Entries are trimmed and blank lines are skipped.
pub fn read_list_file(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
