use super::{count, display, snippet, text, Column, Tabular};
use crate::api::RawItem;
use serde_json::Value;

/// Separator used when flattening the tag list into one cell
const TAG_SEPARATOR: &str = "|";

/// Statistics returned by a detail lookup with `part=statistics`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoStatistics {
    pub tags: Option<Vec<String>>,
    pub dislikes: Option<u64>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comment_count: Option<u64>,
    pub favourites: Option<u64>,
}

/// A video, from either a search hit or a detail lookup
///
/// Search hits carry no statistics, so `statistics` is `None` for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: String,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub title: Option<String>,
    pub published_at: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub statistics: Option<VideoStatistics>,
}

/// Extracts a video ID from either item shape
///
/// Detail lookups put the ID at `id` as a string; search hits nest it as
/// `id.videoId`. Search hits for channels or playlists yield `None`.
pub fn extract_video_id(item: &RawItem) -> Option<String> {
    let id = match item.get("id")? {
        Value::String(id) => Some(id.clone()),
        nested @ Value::Object(_) => text(nested, "videoId"),
        _ => None,
    };
    id.filter(|id| !id.is_empty())
}

impl VideoRecord {
    /// Maps a single search hit or detail item
    pub fn from_item(item: &RawItem) -> Option<Self> {
        Self::from_items(item, None)
    }

    /// Maps a video whose snippet and statistics may come from separate items
    ///
    /// Fields missing from `item` are looked up in `extra`. Returns `None`
    /// only when no video ID can be found.
    pub fn from_items(item: &RawItem, extra: Option<&RawItem>) -> Option<Self> {
        let id = extract_video_id(item).or_else(|| extra.and_then(extract_video_id))?;

        let snip = snippet(item).or_else(|| extra.and_then(snippet));
        let field = |key: &str| snip.and_then(|s| text(s, key));

        let statistics = item
            .get("statistics")
            .or_else(|| extra.and_then(|e| e.get("statistics")))
            .filter(|s| s.is_object())
            .map(|stats| VideoStatistics {
                tags: snip.and_then(tags),
                dislikes: count(stats, "dislikeCount"),
                views: count(stats, "viewCount"),
                likes: count(stats, "likeCount"),
                comment_count: count(stats, "commentCount"),
                favourites: count(stats, "favoriteCount"),
            });

        Some(Self {
            id,
            channel_id: field("channelId"),
            channel_title: field("channelTitle"),
            title: field("title"),
            published_at: field("publishedAt"),
            thumbnail: snip
                .and_then(|s| s.pointer("/thumbnails/high/url"))
                .and_then(Value::as_str)
                .map(str::to_string),
            description: field("description"),
            statistics,
        })
    }

    fn stat<T>(&self, get: impl Fn(&VideoStatistics) -> &Option<T>) -> Option<&T> {
        self.statistics.as_ref().and_then(|s| get(s).as_ref())
    }
}

fn tags(snippet: &Value) -> Option<Vec<String>> {
    snippet.get("tags")?.as_array().map(|tags| {
        tags.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

const VIDEO_COLUMNS: &[Column<VideoRecord>] = &[
    ("id", |v| Some(v.id.clone())),
    ("title", |v| v.title.clone()),
    ("description", |v| v.description.clone()),
    ("published_at", |v| v.published_at.clone()),
    ("channel_id", |v| v.channel_id.clone()),
    ("channel_title", |v| v.channel_title.clone()),
    ("tags", |v| v.stat(|s| &s.tags).map(|t| t.join(TAG_SEPARATOR))),
    ("dislikes", |v| display(&v.stat(|s| &s.dislikes))),
    ("views", |v| display(&v.stat(|s| &s.views))),
    ("likes", |v| display(&v.stat(|s| &s.likes))),
    ("comment_count", |v| display(&v.stat(|s| &s.comment_count))),
    ("favourites", |v| display(&v.stat(|s| &s.favourites))),
    ("thumbnail", |v| v.thumbnail.clone()),
];

impl Tabular for VideoRecord {
    fn columns() -> &'static [Column<Self>] {
        VIDEO_COLUMNS
    }
}
