//! # paint-gallery: image catalog over a flat object store
//!
//! The store only knows flat keys. `paint-gallery` turns them into the three
//! views the backend serves:
//!
//! - **Flat listings**: every key, or every key under a prefix
//! - **Folder trees**: nested folders synthesized from `/`-separated keys
//! - **Validated ingest**: uploads are size-capped and sniffed before they
//!   are written
//!
//! ## Quick Start
//!
//! ```rust
//! use paint_gallery::prelude::*;
//! use paint_blob::MemoryStore;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> GalleryResult<()> {
//! let catalog = ImageCatalog::new(MemoryStore::new(), GalleryConfig::default());
//!
//! let png = Bytes::from_static(b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR");
//! catalog.insert_image("shoes/red/1.png", "image/png", png.clone()).await?;
//! catalog.insert_image("shoes/blue/1.png", "image/png", png).await?;
//!
//! let folders = catalog.list_image_folders().await?;
//! assert_eq!(folders.len(), 1);
//! assert_eq!(folders[0].name, "shoes");
//! # Ok(())
//! # }
//! ```
//!
//! ## Folder identity
//!
//! By default a folder is identified by its bare name, so `a/x/..` and
//! `b/x/..` share a single `x` that shows up under both parents. Existing
//! clients rely on that. [`FolderIdentity::QualifiedPath`] keeps them apart.

mod boundary;
mod catalog;
mod config;
mod error;
pub mod folders;
mod ingest;
mod locks;
pub mod sniff;

pub use boundary::shield;
pub use catalog::ImageCatalog;
pub use config::{FolderIdentity, GalleryConfig, IngestMode};
pub use error::{GalleryError, GalleryResult};
pub use folders::{build_folders, Folder, FolderGraph, FolderId};
pub use ingest::{ImageIngest, PreparedImage};
pub use locks::{KeyGuard, KeyLocks};
pub use sniff::detect_content_type;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Folder, FolderIdentity, GalleryConfig, GalleryError, GalleryResult, ImageCatalog,
        IngestMode,
    };
}
