use paint_blob::BlobError;
use thiserror::Error;

/// Result type for catalog operations
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Errors surfaced by the image catalog.
///
/// `Validation` is the caller's fault, everything else is ours.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error(transparent)]
    Backend {
        #[from]
        source: BlobError,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Limit exceeded: {message}")]
    LimitExceeded { message: String },

    #[error("Internal error")]
    Internal,
}

impl GalleryError {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a limit error
    pub fn limit<S: Into<String>>(message: S) -> Self {
        Self::LimitExceeded {
            message: message.into(),
        }
    }

    /// HTTP-equivalent status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Backend { .. } | Self::Config { .. } | Self::LimitExceeded { .. } | Self::Internal => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Message that is safe to hand back to a caller.
    ///
    /// Backend and validation messages pass through; internal faults never
    /// expose their cause.
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}
