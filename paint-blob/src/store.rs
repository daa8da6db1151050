use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::{BlobResult, ListPage};

/// Core object-store operations - must be implemented by all storage backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of the flat listing, starting after `cursor`
    async fn list_page(&self, cursor: Option<&str>) -> BlobResult<ListPage>;

    /// Store an object under `key`, replacing any previous content
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> BlobResult<PutResult>;

    /// Read a whole object
    async fn get(&self, key: &str) -> BlobResult<GetResult>;

    /// Delete an object
    async fn delete(&self, key: &str) -> BlobResult<()>;
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    pub etag: Option<String>,
    pub size_bytes: u64,
}

/// Result of a get operation
#[derive(Debug, Clone)]
pub struct GetResult {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}
