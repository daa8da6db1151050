use std::sync::Arc;

use bytes::Bytes;
use paint_blob::{list_all, BlobError, ObjectMeta, ObjectStore, S3CompatibleStore, S3Config};
use tracing::{debug, info};

use crate::boundary::shield;
use crate::folders::{Folder, FolderGraph};
use crate::{GalleryConfig, GalleryError, GalleryResult, ImageIngest, KeyLocks};

/// The image operations the rest of the backend builds on.
///
/// Every call re-reads the listing from the store; nothing is cached
/// between calls. Share one catalog through an `Arc`.
pub struct ImageCatalog {
    store: Arc<dyn ObjectStore>,
    ingest: ImageIngest,
    locks: KeyLocks,
}

impl ImageCatalog {
    /// Create a catalog over `store`
    pub fn new<S: ObjectStore + 'static>(store: S, config: GalleryConfig) -> Self {
        Self::with_store(Arc::new(store), config)
    }

    pub fn with_store(store: Arc<dyn ObjectStore>, config: GalleryConfig) -> Self {
        Self {
            store,
            ingest: ImageIngest::new(config),
            locks: KeyLocks::new(),
        }
    }

    /// Create a catalog over an S3-compatible bucket
    pub async fn connect_s3(s3: S3Config, config: GalleryConfig) -> GalleryResult<Self> {
        let store = S3CompatibleStore::connect(s3).await.map_err(setup_error)?;
        Ok(Self::new(store, config))
    }

    /// Bucket settings from `PAINT_S3_*`, catalog settings from `PAINT__IMAGES__*`
    pub async fn from_env() -> GalleryResult<Self> {
        let s3 = S3Config::from_env().map_err(setup_error)?;
        let config = GalleryConfig::from_env()?;
        Self::connect_s3(s3, config).await
    }

    pub fn config(&self) -> &GalleryConfig {
        self.ingest.config()
    }

    /// Every key in the store, in listing order
    pub async fn list_all_images(&self) -> GalleryResult<Vec<String>> {
        shield("list_all_images", self.keys()).await
    }

    /// Every key with its last-modified timestamp, in listing order
    pub async fn list_image_metadata(&self) -> GalleryResult<Vec<ObjectMeta>> {
        shield("list_image_metadata", self.listing()).await
    }

    /// Keys that start with `prefix` and are strictly longer than it.
    ///
    /// A key equal to `prefix` itself (a folder marker, usually) is left out.
    pub async fn list_images_under_prefix(&self, prefix: &str) -> GalleryResult<Vec<String>> {
        shield("list_images_under_prefix", self.keys_under(prefix)).await
    }

    /// Folder roots synthesized from the current listing
    pub async fn list_image_folders(&self) -> GalleryResult<Vec<Folder>> {
        shield("list_image_folders", self.folders()).await
    }

    /// Validate and store an upload, returning the stored key (or its URL).
    ///
    /// `declared_mime` is what the client claimed; the sniffed type is what
    /// gets checked and stored. Nothing is written when validation fails.
    pub async fn insert_image(&self, name: &str, declared_mime: &str, payload: Bytes) -> GalleryResult<String> {
        shield("insert_image", self.store_image(name, declared_mime, payload)).await
    }

    /// Read a stored image back
    pub async fn fetch_image(&self, name: &str) -> GalleryResult<Bytes> {
        shield("fetch_image", self.read_image(name)).await
    }

    /// Remove a stored image.
    ///
    /// A key that was never stored fails like any other backend error.
    pub async fn delete_image(&self, name: &str) -> GalleryResult<()> {
        shield("delete_image", self.remove_image(name)).await
    }

    async fn keys(&self) -> GalleryResult<Vec<String>> {
        Ok(self.listing().await?.into_iter().map(|m| m.key).collect())
    }

    async fn keys_under(&self, prefix: &str) -> GalleryResult<Vec<String>> {
        let keys: Vec<String> = self
            .keys()
            .await?
            .into_iter()
            .filter(|key| key.starts_with(prefix) && key.len() != prefix.len())
            .collect();
        debug!(prefix, matched = keys.len(), "prefix listing");
        Ok(keys)
    }

    async fn folders(&self) -> GalleryResult<Vec<Folder>> {
        let listing = self.listing().await?;
        let graph = FolderGraph::from_keys(
            listing.iter().map(|m| m.key.as_str()),
            self.config().folder_identity,
        );
        debug!(keys = listing.len(), folders = graph.len(), "folder graph built");
        graph.into_folders(self.config().max_folder_nodes)
    }

    async fn store_image(&self, name: &str, declared_mime: &str, payload: Bytes) -> GalleryResult<String> {
        let prepared = self.ingest.prepare(name, payload)?;

        if !declared_mime.is_empty() && declared_mime != prepared.content_type {
            debug!(
                name,
                declared = declared_mime,
                detected = %prepared.content_type,
                "declared content type differs from sniffed type"
            );
        }

        let _guard = self.locks.lock(&prepared.key).await;
        let result = self
            .store
            .put(&prepared.key, &prepared.content_type, prepared.body.clone())
            .await?;

        info!(
            key = %prepared.key,
            size = result.size_bytes,
            content_type = %prepared.content_type,
            "image stored"
        );
        Ok(prepared.reported_name())
    }

    async fn read_image(&self, name: &str) -> GalleryResult<Bytes> {
        Ok(self.store.get(name).await?.body)
    }

    async fn remove_image(&self, name: &str) -> GalleryResult<()> {
        if name.trim().is_empty() {
            return Err(GalleryError::validation("image name must not be empty"));
        }

        let _guard = self.locks.lock(name).await;
        self.store.delete(name).await?;
        info!(key = name, "image deleted");
        Ok(())
    }

    async fn listing(&self) -> GalleryResult<Vec<ObjectMeta>> {
        Ok(list_all(self.store.as_ref()).await?)
    }
}

/// Bucket misconfiguration is ours to fix, not the backend's
fn setup_error(error: BlobError) -> GalleryError {
    match error {
        BlobError::Config { message } => GalleryError::config(message),
        other => other.into(),
    }
}
