//! HTTP-equivalent status codes reported by backing services.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code attached to a backing-service failure.
///
/// Document databases, message buses and blob stores all report failures
/// with HTTP semantics; this wrapper lets each crate's error type expose a
/// uniform classification without depending on an HTTP library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceStatus(u16);

impl ServiceStatus {
    pub const BAD_REQUEST: Self = Self(400);
    pub const UNAUTHORIZED: Self = Self(401);
    pub const FORBIDDEN: Self = Self(403);
    pub const NOT_FOUND: Self = Self(404);
    pub const REQUEST_TIMEOUT: Self = Self(408);
    pub const CONFLICT: Self = Self(409);
    pub const PRECONDITION_FAILED: Self = Self(412);
    pub const PAYLOAD_TOO_LARGE: Self = Self(413);
    pub const TOO_MANY_REQUESTS: Self = Self(429);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);
    pub const SERVICE_UNAVAILABLE: Self = Self(503);

    /// Wraps a raw status code.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        Self(code)
    }

    /// Returns the raw status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_not_found(self) -> bool {
        self.0 == 404
    }

    #[must_use]
    pub const fn is_conflict(self) -> bool {
        self.0 == 409
    }

    #[must_use]
    pub const fn is_throttled(self) -> bool {
        self.0 == 429
    }

    #[must_use]
    pub const fn is_client_error(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    #[must_use]
    pub const fn is_server_error(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    /// Whether a caller-side retry policy may reasonably try again.
    ///
    /// Timeouts, throttling and server-side failures are retryable; every
    /// other client error is not.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        self.0 == 408 || self.0 == 429 || self.is_server_error()
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ServiceStatus {
    fn from(code: u16) -> Self {
        Self(code)
    }
}
