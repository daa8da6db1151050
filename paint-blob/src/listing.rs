use tracing::debug;

use crate::{BlobError, BlobResult, ObjectMeta, ObjectStore};

/// Drain every page of the store's listing into one sequence.
///
/// Entries keep the order the backend returned them in, page after page.
/// No re-sort is applied. Any failing page request fails the whole call.
pub async fn list_all(store: &dyn ObjectStore) -> BlobResult<Vec<ObjectMeta>> {
    let mut page = store.list_page(None).await?;
    let mut entries = Vec::with_capacity(page.entries.len());
    let mut pages = 1usize;

    loop {
        debug!(page = pages, entries = page.entries.len(), truncated = page.truncated, "listing page");
        entries.append(&mut page.entries);

        if !page.truncated {
            break;
        }

        // A truncated page must tell us where to resume, otherwise we would
        // restart from the top forever.
        let cursor = page.next_cursor.take().ok_or_else(|| {
            BlobError::backend_message(format!("listing page {} truncated without a continuation cursor", pages))
        })?;

        page = store.list_page(Some(&cursor)).await?;
        pages += 1;
    }

    debug!(pages, total = entries.len(), "listing complete");
    Ok(entries)
}

/// Same as [`list_all`], keeping only the keys
pub async fn list_keys(store: &dyn ObjectStore) -> BlobResult<Vec<String>> {
    Ok(list_all(store).await?.into_iter().map(|m| m.key).collect())
}
