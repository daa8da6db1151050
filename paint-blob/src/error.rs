use thiserror::Error;

/// Result type for object-store operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur while talking to an object store.
///
/// There is deliberately no "not found" variant: a missing key surfaces as
/// [`BlobError::Backend`] like any other service-side failure.
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl BlobError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create a backend error from a plain message
    pub fn backend_message<S: Into<String>>(message: S) -> Self {
        Self::Backend {
            source: message.into().into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}
