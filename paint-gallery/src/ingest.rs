use bytes::Bytes;
use tracing::{debug, warn};

use crate::sniff::detect_content_type;
use crate::{GalleryConfig, GalleryError, GalleryResult, IngestMode};

/// An upload that passed validation and is ready to be written
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Key the bytes will be stored under
    pub key: String,
    /// Sniffed type, stored as object metadata
    pub content_type: String,
    pub body: Bytes,
    /// Retrieval URL to report instead of the key, if the mode asks for one
    pub location: Option<String>,
}

impl PreparedImage {
    /// What the caller gets back once the write succeeded
    pub fn reported_name(&self) -> String {
        self.location.clone().unwrap_or_else(|| self.key.clone())
    }
}

/// Turns raw uploads into [`PreparedImage`]s or validation errors
#[derive(Debug, Clone)]
pub struct ImageIngest {
    config: GalleryConfig,
}

impl ImageIngest {
    pub fn new(config: GalleryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Validate `payload` for storage under `name`. Performs no I/O.
    pub fn prepare(&self, name: &str, payload: Bytes) -> GalleryResult<PreparedImage> {
        if name.trim().is_empty() {
            return Err(GalleryError::validation("image name must not be empty"));
        }

        if payload.len() > self.config.max_image_bytes {
            warn!(name, size = payload.len(), limit = self.config.max_image_bytes, "rejected oversized image");
            return Err(GalleryError::validation(format!(
                "image is {} bytes, larger than the {} byte limit",
                payload.len(),
                self.config.max_image_bytes
            )));
        }

        match &self.config.ingest_mode {
            IngestMode::Validate => self.validate(name, payload),
            #[cfg(feature = "transcode")]
            IngestMode::Transcode {
                max_width,
                max_height,
                url_base,
            } => transcode::to_jpeg(name, &payload, *max_width, *max_height, url_base.as_deref()),
        }
    }

    fn validate(&self, name: &str, payload: Bytes) -> GalleryResult<PreparedImage> {
        let detected = detect_content_type(&payload);

        if !self.config.allows(detected) {
            warn!(name, detected, "rejected image with disallowed content type");
            return Err(GalleryError::validation(format!(
                "content type {} is not allowed",
                detected
            )));
        }

        debug!(name, detected, size = payload.len(), "image accepted");
        Ok(PreparedImage {
            key: name.to_string(),
            content_type: detected.to_string(),
            body: payload,
            location: None,
        })
    }
}

#[cfg(feature = "transcode")]
mod transcode {
    use std::io::Cursor;

    use bytes::Bytes;
    use image::{imageops::FilterType, DynamicImage, ImageFormat};
    use tracing::{debug, warn};

    use crate::sniff::IMAGE_JPEG;
    use crate::{GalleryError, GalleryResult};

    use super::PreparedImage;

    /// `photo.large.png` → `photo.jpg`
    pub(super) fn jpeg_key(name: &str) -> String {
        let stem = name.split('.').next().unwrap_or(name);
        format!("{}.jpg", stem)
    }

    pub(super) fn to_jpeg(
        name: &str,
        payload: &[u8],
        max_width: u32,
        max_height: u32,
        url_base: Option<&str>,
    ) -> GalleryResult<PreparedImage> {
        let decoded = image::load_from_memory(payload).map_err(|e| {
            warn!(name, error = %e, "rejected undecodable image");
            GalleryError::validation(format!("could not decode image: {}", e))
        })?;

        // JPEG has no alpha channel
        let fitted = DynamicImage::ImageRgb8(
            decoded
                .resize(max_width, max_height, FilterType::Lanczos3)
                .to_rgb8(),
        );

        let mut out = Cursor::new(Vec::new());
        fitted
            .write_to(&mut out, ImageFormat::Jpeg)
            .map_err(|e| GalleryError::validation(format!("could not encode image as JPEG: {}", e)))?;

        let key = jpeg_key(name);
        debug!(name, key = %key, width = fitted.width(), height = fitted.height(), "image transcoded");

        Ok(PreparedImage {
            location: url_base.map(|base| format!("{}/{}", base.trim_end_matches('/'), key)),
            key,
            content_type: IMAGE_JPEG.to_string(),
            body: Bytes::from(out.into_inner()),
        })
    }
}
