use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::error;

use crate::{GalleryError, GalleryResult};

/// Run one catalog operation, turning a panic into [`GalleryError::Internal`].
///
/// The panic payload is logged, never returned.
pub async fn shield<F, T>(operation: &'static str, fut: F) -> GalleryResult<T>
where
    F: Future<Output = GalleryResult<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            error!(operation, panic = %panic_message(payload.as_ref()), "operation panicked");
            Err(GalleryError::Internal)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
