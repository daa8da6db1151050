use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::{BlobError, BlobResult, GetResult, ListPage, ObjectMeta, ObjectStore, PutResult};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// In-memory store for testing and development.
///
/// Keys are listed in lexicographic order, `page_size` at a time; the cursor
/// handed out is the last key of the previous page.
#[derive(Clone)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Same page size S3 uses for ListObjectsV2
    pub const DEFAULT_PAGE_SIZE: usize = 1000;

    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    /// Content type recorded for `key`, if stored
    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects.read().get(key).map(|o| o.content_type.clone())
    }

    fn missing(op: &str, key: &str) -> BlobError {
        BlobError::backend_message(format!("{} {}: NoSuchKey", op, key))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(&self, cursor: Option<&str>) -> BlobResult<ListPage> {
        let objects = self.objects.read();

        let lower = match cursor {
            Some(after) => Bound::Excluded(after.to_string()),
            None => Bound::Unbounded,
        };

        let mut range = objects.range((lower, Bound::Unbounded));
        let entries: Vec<ObjectMeta> = range
            .by_ref()
            .take(self.page_size)
            .map(|(key, object)| ObjectMeta::new(key.clone()).with_last_modified(object.last_modified))
            .collect();

        if range.next().is_some() {
            let cursor = entries
                .last()
                .map(|m| m.key.clone())
                .unwrap_or_default();
            Ok(ListPage::more(entries, cursor))
        } else {
            Ok(ListPage::last(entries))
        }
    }

    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> BlobResult<PutResult> {
        if key.is_empty() {
            return Err(BlobError::invalid("object key must not be empty"));
        }

        let size_bytes = body.len() as u64;
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );

        Ok(PutResult {
            etag: None,
            size_bytes,
        })
    }

    async fn get(&self, key: &str) -> BlobResult<GetResult> {
        let objects = self.objects.read();
        let object = objects.get(key).ok_or_else(|| Self::missing("GetObject", key))?;

        Ok(GetResult {
            body: object.body.clone(),
            content_type: Some(object.content_type.clone()),
            last_modified: Some(object.last_modified),
        })
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.objects
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| Self::missing("DeleteObject", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(page_size: usize, keys: &[&str]) -> MemoryStore {
        let store = MemoryStore::new().with_page_size(page_size);
        for key in keys {
            store.put(key, "image/png", Bytes::from_static(b"x")).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn pages_follow_the_cursor() {
        let store = seeded(2, &["a", "b", "c", "d", "e"]).await;

        let first = store.list_page(None).await.unwrap();
        assert!(first.truncated);
        assert_eq!(first.next_cursor.as_deref(), Some("b"));

        let second = store.list_page(first.next_cursor.as_deref()).await.unwrap();
        let keys: Vec<_> = second.entries.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "d"]);

        let third = store.list_page(second.next_cursor.as_deref()).await.unwrap();
        assert!(!third.truncated);
        assert_eq!(third.next_cursor, None);
        assert_eq!(third.entries.len(), 1);
    }

    #[tokio::test]
    async fn exact_page_boundary_is_not_truncated() {
        let store = seeded(2, &["a", "b"]).await;
        let page = store.list_page(None).await.unwrap();
        assert!(!page.truncated);
        assert_eq!(page.entries.len(), 2);
    }

    #[tokio::test]
    async fn missing_keys_are_plain_backend_errors() {
        let store = MemoryStore::new();
        assert!(store.get("nope").await.unwrap_err().is_backend());
        assert!(store.delete("nope").await.unwrap_err().is_backend());
    }

    #[tokio::test]
    async fn put_overwrites_and_records_content_type() {
        let store = MemoryStore::new();
        store.put("k", "image/png", Bytes::from_static(b"1")).await.unwrap();
        store.put("k", "image/jpeg", Bytes::from_static(b"22")).await.unwrap();

        let got = store.get("k").await.unwrap();
        assert_eq!(got.body, Bytes::from_static(b"22"));
        assert_eq!(store.content_type_of("k").as_deref(), Some("image/jpeg"));
        assert_eq!(store.len(), 1);
    }
}
