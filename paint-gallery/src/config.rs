//! Catalog configuration.
//!
//! Built in code through the `with_*` builders, or layered from the
//! environment with [`GalleryConfig::from_env`]:
//!
//! ```bash
//! export PAINT__IMAGES__MAX_BYTES=5242880
//! export PAINT__IMAGES__ALLOWED_TYPES=image/png,image/jpeg
//! export PAINT__IMAGES__FOLDER_IDENTITY=path
//! ```

use std::collections::BTreeSet;
use std::env;

use crate::{GalleryError, GalleryResult};

/// How synthesized folders are told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderIdentity {
    /// A folder is its bare segment name: `a/x/..` and `b/x/..` share one `x`.
    /// Compatible with existing clients.
    #[default]
    SegmentName,
    /// A folder is its full ancestor path: `a/x` and `b/x` are distinct.
    QualifiedPath,
}

impl std::str::FromStr for FolderIdentity {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "segment" | "segment_name" | "name" => Ok(Self::SegmentName),
            "path" | "qualified_path" => Ok(Self::QualifiedPath),
            other => Err(GalleryError::config(format!(
                "unknown folder identity {:?} (expected \"segment\" or \"path\")",
                other
            ))),
        }
    }
}

/// What happens to an accepted upload before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IngestMode {
    /// Sniff, check against the allow-list, store the bytes untouched
    #[default]
    Validate,
    /// Decode, shrink into a bounding box, re-encode as JPEG under `<stem>.jpg`.
    /// Kept for clients that still expect the old thumbnails.
    #[cfg(feature = "transcode")]
    Transcode {
        max_width: u32,
        max_height: u32,
        /// When set, inserts return `url_base/key` instead of the bare key
        url_base: Option<String>,
    },
}

#[cfg(feature = "transcode")]
impl IngestMode {
    /// The 300x300 JPEG thumbnails older clients were built against
    pub fn legacy_thumbnails(url_base: Option<String>) -> Self {
        Self::Transcode {
            max_width: 300,
            max_height: 300,
            url_base,
        }
    }
}

/// Configuration for the image catalog
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Largest payload accepted by `insert_image`
    pub max_image_bytes: usize,

    /// Sniffed MIME types accepted by `insert_image`
    pub allowed_types: BTreeSet<String>,

    pub ingest_mode: IngestMode,

    pub folder_identity: FolderIdentity,

    /// Most folders `list_image_folders` will emit; merged folders count once per copy
    pub max_folder_nodes: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024, // 10MiB
            allowed_types: ["image/png", "image/jpeg"]
                .into_iter()
                .map(String::from)
                .collect(),
            ingest_mode: IngestMode::default(),
            folder_identity: FolderIdentity::default(),
            max_folder_nodes: 100_000,
        }
    }
}

impl GalleryConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `PAINT__IMAGES__*` environment variables
    pub fn from_env() -> GalleryResult<Self> {
        Self::from_vars(env::vars())
    }

    pub(crate) fn from_vars<I>(vars: I) -> GalleryResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let Some(name) = key.strip_prefix("PAINT__IMAGES__") else {
                continue;
            };

            match name.to_ascii_lowercase().as_str() {
                "max_bytes" => {
                    config.max_image_bytes = value.trim().parse().map_err(|_| {
                        GalleryError::config(format!("{} must be a byte count, got {:?}", key, value))
                    })?;
                }
                "allowed_types" => {
                    config.allowed_types = value
                        .split(',')
                        .map(|t| t.trim().to_ascii_lowercase())
                        .filter(|t| !t.is_empty())
                        .collect();
                }
                "max_folder_nodes" => {
                    config.max_folder_nodes = value.trim().parse().map_err(|_| {
                        GalleryError::config(format!("{} must be a folder count, got {:?}", key, value))
                    })?;
                }
                "folder_identity" => config.folder_identity = value.parse()?,
                _ => {}
            }
        }

        Ok(config)
    }

    /// Set max payload size
    pub fn with_max_image_bytes(mut self, bytes: usize) -> Self {
        self.max_image_bytes = bytes;
        self
    }

    /// Replace the allow-list of sniffed types
    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ingest_mode(mut self, mode: IngestMode) -> Self {
        self.ingest_mode = mode;
        self
    }

    pub fn with_folder_identity(mut self, identity: FolderIdentity) -> Self {
        self.folder_identity = identity;
        self
    }

    pub fn with_max_folder_nodes(mut self, max: usize) -> Self {
        self.max_folder_nodes = max;
        self
    }

    pub fn allows(&self, mime: &str) -> bool {
        self.allowed_types.contains(mime)
    }
}
