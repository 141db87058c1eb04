//! Error types for the document layer.

use nucleus_types::{Canceled, ServiceStatus};
use std::time::Duration;
use thiserror::Error;

/// Result type for [`DocumentStore`](crate::DocumentStore) calls.
pub type StoreResult<T> = Result<T, DocumentStoreError>;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures reported by a document store client.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// No document with this key exists.
    #[error("document not found: {id} (partition {partition_key})")]
    NotFound { partition_key: String, id: String },

    /// The container itself does not exist.
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// A document with this key already exists.
    #[error("document already exists: {id} (partition {partition_key})")]
    Conflict { partition_key: String, id: String },

    /// Request rate too large.
    #[error("request throttled")]
    Throttled { retry_after: Option<Duration> },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed request, including queries the store cannot parse.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request never produced a service response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Any other service response.
    #[error("service error ({status}): {message}")]
    Service {
        status: ServiceStatus,
        message: String,
    },
}

impl DocumentStoreError {
    /// HTTP-equivalent status of the failure, if the service answered.
    pub fn status(&self) -> Option<ServiceStatus> {
        match self {
            Self::NotFound { .. } | Self::ContainerNotFound(_) => Some(ServiceStatus::NOT_FOUND),
            Self::Conflict { .. } => Some(ServiceStatus::CONFLICT),
            Self::Throttled { .. } => Some(ServiceStatus::TOO_MANY_REQUESTS),
            Self::Unauthorized(_) => Some(ServiceStatus::UNAUTHORIZED),
            Self::BadRequest(_) => Some(ServiceStatus::BAD_REQUEST),
            Self::Service { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    /// True for every failure the service reports as 404.
    pub fn is_not_found(&self) -> bool {
        self.status().is_some_and(ServiceStatus::is_not_found)
    }

    /// True for throttling, timeouts, server errors and transport failures.
    pub fn is_retryable(&self) -> bool {
        match self.status() {
            Some(status) => status.is_retryable(),
            None => true,
        }
    }

    /// Suggested delay before retrying a throttled request.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Throttled { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The cancellation signal fired before or during the operation.
    #[error(transparent)]
    Canceled(#[from] Canceled),

    /// The store failed; passed through unchanged.
    #[error(transparent)]
    Store(#[from] DocumentStoreError),

    /// An entity could not be converted to or from its stored JSON form.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }

    /// The underlying store failure, if this is one.
    pub fn store_error(&self) -> Option<&DocumentStoreError> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}
