//! Flat records mapped from API resources
//!
//! Each record type declares its output columns as an ordered list of
//! `(name, accessor)` pairs. Writers iterate that list; nothing is
//! discovered at runtime.

mod channel;
mod comment;
mod video;

pub use channel::{ChannelRecord, ChannelStatistics};
pub use comment::CommentRecord;
pub use video::{extract_video_id, VideoRecord, VideoStatistics};

use crate::api::RawItem;
use serde_json::Value;

/// A named column and the accessor producing its cell
///
/// `None` is written as an empty cell.
pub type Column<R> = (&'static str, fn(&R) -> Option<String>);

/// A record with a fixed, ordered column set
pub trait Tabular: Sized + 'static {
    /// Column definitions in output order
    fn columns() -> &'static [Column<Self>];

    /// Column names in output order
    fn header() -> Vec<&'static str> {
        Self::columns().iter().map(|(name, _)| *name).collect()
    }

    /// Cell values in output order
    fn row(&self) -> Vec<Option<String>> {
        Self::columns().iter().map(|(_, cell)| cell(self)).collect()
    }
}

/// Reads a string field
pub(crate) fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

/// Reads a count that the API may send either as a string or a number
pub(crate) fn count(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Returns the `snippet` object of an item, if any
pub(crate) fn snippet(item: &RawItem) -> Option<&Value> {
    item.get("snippet").filter(|s| s.is_object())
}

pub(crate) fn display<T: ToString>(value: &Option<T>) -> Option<String> {
    value.as_ref().map(ToString::to_string)
}
