//! # paint-blob: object-store seam for the paint backend
//!
//! `paint-blob` is the storage layer the image catalog is built on. It owns
//! the one contract the rest of the system consumes from an object store:
//! single-object put/get/delete and one page of a flat listing.
//!
//! ## Key Features
//!
//! - **Storage agnostic**: everything goes through [`ObjectStore`]
//! - **S3-compatible backend**: [`S3CompatibleStore`] talks to AWS S3, MinIO, RustFS, ...
//! - **In-memory backend**: [`MemoryStore`] with a configurable page size for tests
//! - **Listing aggregation**: [`list_all`] drains every page of a listing in backend order
//!
//! ## Quick Start
//!
//! ```rust
//! use paint_blob::prelude::*;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = MemoryStore::new().with_page_size(2);
//!
//! store.put("shoes/red/1.png", "image/png", Bytes::from_static(b"...")).await?;
//! store.put("shoes/red/2.png", "image/png", Bytes::from_static(b"...")).await?;
//! store.put("shoes/blue/1.png", "image/png", Bytes::from_static(b"...")).await?;
//!
//! // Two pages under the hood, one ordered sequence for the caller
//! let keys = paint_blob::list_keys(&store).await?;
//! assert_eq!(keys.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Image catalog   │  ← folder trees, ingest validation
//! ├──────────────────┤
//! │ Listing helpers  │  ← list_all / list_keys
//! ├──────────────────┤
//! │   ObjectStore    │  ← storage primitives
//! └──────────────────┘
//! ```

mod config;
mod error;
mod listing;
mod memory_store;
mod s3_store;
pub mod store;
mod types;

pub use config::S3Config;
pub use error::{BlobError, BlobResult};
pub use listing::{list_all, list_keys};
pub use memory_store::MemoryStore;
pub use s3_store::S3CompatibleStore;
pub use store::{GetResult, ObjectStore, PutResult};
pub use types::{ListPage, ObjectMeta};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobError, BlobResult, ListPage, MemoryStore, ObjectMeta, ObjectStore, S3CompatibleStore,
        S3Config,
    };
}
