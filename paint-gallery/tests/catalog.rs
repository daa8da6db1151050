use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use paint_blob::{BlobError, BlobResult, GetResult, ListPage, MemoryStore, ObjectStore, PutResult};
use paint_gallery::prelude::*;
use serde_json::json;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01";
const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00";
const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00";

/// Test factory functions
fn png() -> Bytes {
    Bytes::from_static(PNG)
}

async fn seeded_store(page_size: usize, keys: &[&str]) -> MemoryStore {
    let store = MemoryStore::new().with_page_size(page_size);
    for key in keys {
        store.put(key, "image/png", png()).await.unwrap();
    }
    store
}

fn catalog_over(store: &MemoryStore) -> ImageCatalog {
    ImageCatalog::new(store.clone(), GalleryConfig::default())
}

/// Counts writes and forwards everything to an in-memory store
struct CountingStore {
    inner: MemoryStore,
    puts: Arc<AtomicUsize>,
}

#[async_trait]
impl ObjectStore for CountingStore {
    async fn list_page(&self, cursor: Option<&str>) -> BlobResult<ListPage> {
        self.inner.list_page(cursor).await
    }

    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> BlobResult<PutResult> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, content_type, body).await
    }

    async fn get(&self, key: &str) -> BlobResult<GetResult> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.inner.delete(key).await
    }
}

/// Every call fails the way an unreachable service would
struct UnreachableStore;

#[async_trait]
impl ObjectStore for UnreachableStore {
    async fn list_page(&self, _cursor: Option<&str>) -> BlobResult<ListPage> {
        Err(BlobError::backend_message("connection refused"))
    }

    async fn put(&self, _key: &str, _content_type: &str, _body: Bytes) -> BlobResult<PutResult> {
        Err(BlobError::backend_message("connection refused"))
    }

    async fn get(&self, _key: &str) -> BlobResult<GetResult> {
        Err(BlobError::backend_message("connection refused"))
    }

    async fn delete(&self, _key: &str) -> BlobResult<()> {
        Err(BlobError::backend_message("connection refused"))
    }
}

/// A backend with a bug in it
struct PanickingStore;

#[async_trait]
impl ObjectStore for PanickingStore {
    async fn list_page(&self, _cursor: Option<&str>) -> BlobResult<ListPage> {
        panic!("index out of bounds in listing decoder")
    }

    async fn put(&self, _key: &str, _content_type: &str, _body: Bytes) -> BlobResult<PutResult> {
        panic!("put exploded")
    }

    async fn get(&self, _key: &str) -> BlobResult<GetResult> {
        panic!("get exploded")
    }

    async fn delete(&self, _key: &str) -> BlobResult<()> {
        panic!("delete exploded")
    }
}

#[tokio::test]
async fn shoes_listing_becomes_one_folder_tree() {
    let store = seeded_store(2, &["shoes/red/1.png", "shoes/red/2.png", "shoes/blue/1.png"]).await;
    let catalog = catalog_over(&store);

    let folders = catalog.list_image_folders().await.unwrap();

    assert_eq!(folders.len(), 1);
    assert_eq!(
        folders[0].normalized(),
        Folder::new("shoes").with_nested(vec![Folder::new("blue"), Folder::new("red")])
    );
    assert_eq!(
        serde_json::to_value(folders[0].normalized()).unwrap(),
        json!({
            "name": "shoes",
            "nested": [
                { "name": "blue", "nested": [] },
                { "name": "red", "nested": [] }
            ]
        })
    );
}

#[tokio::test]
async fn empty_store_has_no_folders() {
    let catalog = catalog_over(&MemoryStore::new());
    assert!(catalog.list_image_folders().await.unwrap().is_empty());
    assert!(catalog.list_all_images().await.unwrap().is_empty());
}

#[tokio::test]
async fn same_named_folders_merge_by_default() {
    let store = seeded_store(1, &["a/x/file1", "b/x/file2"]).await;
    let catalog = catalog_over(&store);

    let mut folders = catalog.list_image_folders().await.unwrap();
    folders.sort_by(|l, r| l.name.cmp(&r.name));

    assert_eq!(folders.len(), 2);
    assert_eq!(folders[0].child("x"), Some(&Folder::new("x")));
    assert_eq!(folders[1].child("x"), Some(&Folder::new("x")));
}

#[tokio::test]
async fn qualified_identity_is_selectable() {
    let store = seeded_store(10, &["a/x/y/1.png", "b/x/z/2.png"]).await;
    let catalog = ImageCatalog::new(
        store,
        GalleryConfig::default().with_folder_identity(FolderIdentity::QualifiedPath),
    );

    let mut folders = catalog.list_image_folders().await.unwrap();
    folders.sort_by(|l, r| l.name.cmp(&r.name));

    let under_a = folders[0].child("x").unwrap();
    let under_b = folders[1].child("x").unwrap();
    assert!(under_a.child("y").is_some() && under_a.child("z").is_none());
    assert!(under_b.child("z").is_some() && under_b.child("y").is_none());
}

#[tokio::test]
async fn runaway_folder_expansion_is_refused() {
    // Every folder on one level points at both folders of the next one
    let mut keys = Vec::new();
    for i in 0..40 {
        for from in ["a", "b"] {
            for to in ["a", "b"] {
                keys.push(format!("{}{}/{}{}/f.png", from, i, to, i + 1));
            }
        }
    }
    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
    let store = seeded_store(50, &keys).await;
    let catalog = ImageCatalog::new(store, GalleryConfig::default().with_max_folder_nodes(5_000));

    let err = catalog.list_image_folders().await.unwrap_err();
    assert!(matches!(err, GalleryError::LimitExceeded { .. }));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn self_named_subfolder_keeps_its_parent_visible() {
    let store = seeded_store(10, &["photos/red/1.png", "photos/photos/2.png"]).await;

    let folders = catalog_over(&store).list_image_folders().await.unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name, "photos");
    assert!(folders[0].child("red").is_some());
}

#[tokio::test]
async fn all_images_span_every_page() {
    let keys: Vec<String> = (0..7).map(|i| format!("gallery/{}.png", i)).collect();
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let store = seeded_store(3, &refs).await;

    let listed = catalog_over(&store).list_all_images().await.unwrap();

    assert_eq!(listed, keys);
}

#[tokio::test]
async fn metadata_listing_carries_timestamps() {
    let store = seeded_store(2, &["a/1.png", "a/2.png", "b/1.png"]).await;

    let metas = catalog_over(&store).list_image_metadata().await.unwrap();

    assert_eq!(metas.len(), 3);
    assert!(metas.iter().all(|m| m.last_modified.is_some()));
}

#[tokio::test]
async fn prefix_listing_excludes_the_prefix_itself() {
    let store = seeded_store(2, &["hats/1.png", "shoes", "shoes/", "shoes/red/1.png", "shoesbox.png"]).await;
    let catalog = catalog_over(&store);

    assert_eq!(
        catalog.list_images_under_prefix("shoes/").await.unwrap(),
        vec!["shoes/red/1.png"]
    );
    assert_eq!(
        catalog.list_images_under_prefix("shoes").await.unwrap(),
        vec!["shoes/", "shoes/red/1.png", "shoesbox.png"]
    );
    assert!(catalog.list_images_under_prefix("socks/").await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_stores_sniffed_type() {
    let store = MemoryStore::new();
    let catalog = catalog_over(&store);

    // Client claims JPEG, bytes say PNG
    let key = catalog.insert_image("shoes/red/3.png", "image/jpeg", png()).await.unwrap();

    assert_eq!(key, "shoes/red/3.png");
    assert_eq!(store.content_type_of("shoes/red/3.png").as_deref(), Some("image/png"));
    assert_eq!(catalog.fetch_image("shoes/red/3.png").await.unwrap(), png());

    catalog
        .insert_image("shoes/red/4.jpg", "image/jpeg", Bytes::from_static(JPEG))
        .await
        .unwrap();
    assert_eq!(store.content_type_of("shoes/red/4.jpg").as_deref(), Some("image/jpeg"));
}

#[tokio::test]
async fn oversized_insert_never_reaches_the_store() {
    let puts = Arc::new(AtomicUsize::new(0));
    let store = CountingStore {
        inner: MemoryStore::new(),
        puts: Arc::clone(&puts),
    };
    let catalog = ImageCatalog::new(store, GalleryConfig::default());

    let payload = {
        let mut bytes = PNG.to_vec();
        bytes.resize(10 * 1024 * 1024 + 1, 0);
        Bytes::from(bytes)
    };
    let err = catalog.insert_image("huge.png", "image/png", payload).await.unwrap_err();

    assert!(matches!(err, GalleryError::Validation { .. }));
    assert_eq!(err.status_code(), 400);
    assert_eq!(puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn gif_insert_is_rejected_by_type_name() {
    let puts = Arc::new(AtomicUsize::new(0));
    let store = CountingStore {
        inner: MemoryStore::new(),
        puts: Arc::clone(&puts),
    };
    let catalog = ImageCatalog::new(store, GalleryConfig::default());

    let err = catalog
        .insert_image("anim.gif", "image/gif", Bytes::from_static(GIF))
        .await
        .unwrap_err();

    assert!(matches!(err, GalleryError::Validation { .. }));
    assert!(err.client_message().contains("image/gif"));
    assert_eq!(puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_name_is_a_client_error() {
    let catalog = catalog_over(&MemoryStore::new());
    let err = catalog.insert_image("", "image/png", png()).await.unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn deleting_unknown_key_looks_like_any_backend_failure() {
    let missing = catalog_over(&MemoryStore::new())
        .delete_image("never/stored.png")
        .await
        .unwrap_err();
    let unreachable = ImageCatalog::new(UnreachableStore, GalleryConfig::default())
        .delete_image("shoes/red/1.png")
        .await
        .unwrap_err();

    assert!(matches!(missing, GalleryError::Backend { .. }));
    assert!(matches!(unreachable, GalleryError::Backend { .. }));
    assert_eq!(missing.status_code(), unreachable.status_code());
}

#[tokio::test]
async fn delete_removes_the_key() {
    let store = seeded_store(10, &["a/1.png", "a/2.png"]).await;
    let catalog = catalog_over(&store);

    catalog.delete_image("a/1.png").await.unwrap();

    assert_eq!(catalog.list_all_images().await.unwrap(), vec!["a/2.png"]);
}

#[tokio::test]
async fn backend_failures_propagate_from_every_read() {
    let catalog = ImageCatalog::new(UnreachableStore, GalleryConfig::default());

    assert!(matches!(catalog.list_all_images().await, Err(GalleryError::Backend { .. })));
    assert!(matches!(catalog.list_image_folders().await, Err(GalleryError::Backend { .. })));
    assert!(matches!(
        catalog.list_images_under_prefix("a/").await,
        Err(GalleryError::Backend { .. })
    ));
    assert!(matches!(catalog.fetch_image("a/1.png").await, Err(GalleryError::Backend { .. })));
    assert!(matches!(
        catalog.insert_image("a/1.png", "image/png", png()).await,
        Err(GalleryError::Backend { .. })
    ));
}

#[tokio::test]
async fn panics_are_contained() {
    let catalog = ImageCatalog::new(PanickingStore, GalleryConfig::default());

    let err = catalog.list_image_folders().await.unwrap_err();
    assert!(matches!(err, GalleryError::Internal));
    assert_eq!(err.status_code(), 500);
    assert!(!err.client_message().contains("decoder"));

    // The catalog is still usable afterwards
    assert!(matches!(
        catalog.delete_image("a.png").await,
        Err(GalleryError::Internal)
    ));
}

#[tokio::test]
async fn concurrent_inserts_all_land() {
    let store = MemoryStore::new();
    let catalog = Arc::new(catalog_over(&store));

    let mut handles = Vec::new();
    for i in 0..32 {
        let catalog = Arc::clone(&catalog);
        handles.push(tokio::spawn(async move {
            // Half the tasks fight over one key
            let key = if i % 2 == 0 {
                "shared/hot.png".to_string()
            } else {
                format!("spread/{}.png", i)
            };
            catalog.insert_image(&key, "image/png", png()).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.len(), 1 + 16);
    assert!(store.contains("shared/hot.png"));
}
