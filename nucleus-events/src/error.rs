//! Error types for event publication.

use nucleus_types::{Canceled, ServiceStatus};
use thiserror::Error;

/// Result type for transport calls.
pub type MessageResult<T> = Result<T, MessageError>;

/// Result type for stream operations.
pub type EventStreamResult<T> = Result<T, EventStreamError>;

/// Failures reported by a message transport.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// The transport refused the batch as a whole.
    #[error("batch of {size} messages exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("message of {size} bytes exceeds the limit of {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl MessageError {
    /// HTTP-equivalent status of the failure, if the service answered.
    pub fn status(&self) -> Option<ServiceStatus> {
        match self {
            Self::ChannelNotFound(_) => Some(ServiceStatus::NOT_FOUND),
            Self::BatchTooLarge { .. } | Self::MessageTooLarge { .. } => {
                Some(ServiceStatus::PAYLOAD_TOO_LARGE)
            }
            Self::Unauthorized(_) => Some(ServiceStatus::UNAUTHORIZED),
            Self::Transport(_) => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self.status() {
            Some(status) => status.is_retryable(),
            None => true,
        }
    }
}

/// Errors returned by [`EventStream`](crate::EventStream) operations.
#[derive(Debug, Error)]
pub enum EventStreamError {
    #[error(transparent)]
    Canceled(#[from] Canceled),

    /// An event could not be serialized; nothing was sent.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport failed; passed through unchanged.
    #[error(transparent)]
    Transport(#[from] MessageError),
}

impl EventStreamError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }
}
