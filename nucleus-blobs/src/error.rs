//! Error types for blob storage.

use nucleus_types::{Canceled, ServiceStatus};
use thiserror::Error;

/// Result type for blob service calls.
pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

/// Result type for repository operations.
pub type BlobRepositoryResult<T> = Result<T, BlobRepositoryError>;

/// Failures reported by a blob service.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("blob not found: {container}/{name}")]
    BlobNotFound { container: String, name: String },

    #[error("blob already exists: {container}/{name}")]
    BlobAlreadyExists { container: String, name: String },

    #[error("container already exists: {0}")]
    ContainerAlreadyExists(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(String),
}

impl BlobStoreError {
    /// HTTP-equivalent status of the failure, if the service answered.
    pub fn status(&self) -> Option<ServiceStatus> {
        match self {
            Self::ContainerNotFound(_) | Self::BlobNotFound { .. } => {
                Some(ServiceStatus::NOT_FOUND)
            }
            Self::BlobAlreadyExists { .. } | Self::ContainerAlreadyExists(_) => {
                Some(ServiceStatus::CONFLICT)
            }
            Self::Unauthorized(_) => Some(ServiceStatus::UNAUTHORIZED),
            Self::InvalidName(_) | Self::InvalidUrl(_) => Some(ServiceStatus::BAD_REQUEST),
            Self::Transport(_) => None,
        }
    }

    /// True for a missing container or a missing blob.
    pub fn is_not_found(&self) -> bool {
        self.status().is_some_and(ServiceStatus::is_not_found)
    }

    pub fn is_retryable(&self) -> bool {
        match self.status() {
            Some(status) => status.is_retryable(),
            None => true,
        }
    }
}

/// Errors returned by [`BlobRepository`](crate::BlobRepository) operations.
#[derive(Debug, Error)]
pub enum BlobRepositoryError {
    #[error(transparent)]
    Canceled(#[from] Canceled),

    /// The blob service failed; passed through unchanged.
    #[error(transparent)]
    Store(#[from] BlobStoreError),
}

impl BlobRepositoryError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }

    pub fn store_error(&self) -> Option<&BlobStoreError> {
        match self {
            Self::Store(err) => Some(err),
            Self::Canceled(_) => None,
        }
    }
}
