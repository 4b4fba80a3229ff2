use super::{count, display, snippet, text, Column, Tabular};
use crate::api::RawItem;

/// A top-level comment on a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: String,
    pub author_name: Option<String>,
    pub author_channel_url: Option<String>,
    pub text: Option<String>,
    pub like_count: Option<u64>,
    pub published_at: Option<String>,
    pub video_id: Option<String>,
}

impl CommentRecord {
    /// Maps a `commentThreads` item via its `snippet.topLevelComment`
    ///
    /// The thread's own `snippet.videoId` fills in the parent video when
    /// the comment snippet omits it.
    pub fn from_thread(thread: &RawItem) -> Option<Self> {
        let thread_snippet = snippet(thread)?;
        let comment = thread_snippet.get("topLevelComment")?;
        let mut record = Self::from_comment(comment)?;
        if record.video_id.is_none() {
            record.video_id = text(thread_snippet, "videoId");
        }
        Some(record)
    }

    /// Maps a `comment` resource
    pub fn from_comment(comment: &RawItem) -> Option<Self> {
        let id = text(comment, "id").filter(|id| !id.is_empty())?;
        let snip = snippet(comment);
        let field = |key: &str| snip.and_then(|s| text(s, key));

        Some(Self {
            id,
            author_name: field("authorDisplayName"),
            author_channel_url: field("authorChannelUrl"),
            text: field("textOriginal"),
            like_count: snip.and_then(|s| count(s, "likeCount")),
            published_at: field("publishedAt"),
            video_id: field("videoId"),
        })
    }
}

const COMMENT_COLUMNS: &[Column<CommentRecord>] = &[
    ("id", |c| Some(c.id.clone())),
    ("author_name", |c| c.author_name.clone()),
    ("text", |c| c.text.clone()),
    ("like_count", |c| display(&c.like_count)),
    ("published_at", |c| c.published_at.clone()),
    ("video_id", |c| c.video_id.clone()),
    ("author_channel_url", |c| c.author_channel_url.clone()),
];

impl Tabular for CommentRecord {
    fn columns() -> &'static [Column<Self>] {
        COMMENT_COLUMNS
    }
}
