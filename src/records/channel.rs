use super::{count, display, text, Column, Tabular};
use crate::api::RawItem;

/// Channel statistics from `channels.list` with `part=statistics`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelStatistics {
    pub views: Option<u64>,
    pub comment_count: Option<u64>,
    pub video_count: Option<u64>,
    pub subscriber_count: Option<u64>,
    pub hidden_subscriber_count: Option<bool>,
}

/// A channel and its statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub id: String,
    pub statistics: Option<ChannelStatistics>,
}

impl ChannelRecord {
    pub fn from_item(item: &RawItem) -> Option<Self> {
        let id = text(item, "id").filter(|id| !id.is_empty())?;
        let statistics = item
            .get("statistics")
            .filter(|s| s.is_object())
            .map(|stats| ChannelStatistics {
                views: count(stats, "viewCount"),
                comment_count: count(stats, "commentCount"),
                video_count: count(stats, "videoCount"),
                subscriber_count: count(stats, "subscriberCount"),
                hidden_subscriber_count: stats
                    .get("hiddenSubscriberCount")
                    .and_then(|v| v.as_bool()),
            });

        Some(Self { id, statistics })
    }

    fn stat<T: ToString>(&self, get: impl Fn(&ChannelStatistics) -> &Option<T>) -> Option<String> {
        self.statistics.as_ref().and_then(|s| display(get(s)))
    }
}

const CHANNEL_COLUMNS: &[Column<ChannelRecord>] = &[
    ("id", |c| Some(c.id.clone())),
    ("views", |c| c.stat(|s| &s.views)),
    ("comment_count", |c| c.stat(|s| &s.comment_count)),
    ("video_count", |c| c.stat(|s| &s.video_count)),
    ("subscriber_count", |c| c.stat(|s| &s.subscriber_count)),
    ("hidden_subscriber_count", |c| {
        c.stat(|s| &s.hidden_subscriber_count)
    }),
];

impl Tabular for ChannelRecord {
    fn columns() -> &'static [Column<Self>] {
        CHANNEL_COLUMNS
    }
}
