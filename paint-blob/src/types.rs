use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key and timestamp of one stored object, as reported by a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self {
            key: key.into(),
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }
}

/// One page of a flat listing.
///
/// `next_cursor` is opaque; callers only hand it back to the same store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub entries: Vec<ObjectMeta>,
    pub truncated: bool,
    pub next_cursor: Option<String>,
}

impl ListPage {
    /// A final page: nothing more to fetch
    pub fn last(entries: Vec<ObjectMeta>) -> Self {
        Self {
            entries,
            truncated: false,
            next_cursor: None,
        }
    }

    /// A page followed by more data reachable through `cursor`
    pub fn more<S: Into<String>>(entries: Vec<ObjectMeta>, cursor: S) -> Self {
        Self {
            entries,
            truncated: true,
            next_cursor: Some(cursor.into()),
        }
    }
}
