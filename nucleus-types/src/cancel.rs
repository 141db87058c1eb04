//! Cooperative cancellation for repository and stream operations.
//!
//! Every suspension-capable operation in the toolkit takes a `&Cancellation`
//! as its last parameter. The signal is checked on entry, so a signal that is
//! already triggered never reaches the backing service, and every round trip
//! is raced against it so a signal raised mid-flight aborts promptly.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// The distinct condition reported when an operation was aborted by its
/// cancellation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation canceled")]
pub struct Canceled;

/// A clonable cancellation signal.
///
/// Clones share state: cancelling any clone cancels all of them. Child
/// signals created with [`Cancellation::child`] are cancelled with their
/// parent but can also be cancelled on their own.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: CancellationToken,
}

impl Cancellation {
    /// Creates a fresh, untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias of [`new`](Self::new) for call sites that never cancel. The
    /// returned signal is not shared, so nothing can trigger it.
    #[must_use]
    pub fn none() -> Self {
        Self::new()
    }

    /// Creates a signal that is already triggered.
    #[must_use]
    pub fn canceled() -> Self {
        let signal = Self::default();
        signal.cancel();
        signal
    }

    /// Returns a child signal that is cancelled whenever `self` is.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Triggers the signal.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the signal has been triggered.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fails with [`Canceled`] if the signal has been triggered.
    pub fn check(&self) -> Result<(), Canceled> {
        if self.is_canceled() {
            Err(Canceled)
        } else {
            Ok(())
        }
    }

    /// Resolves once the signal is triggered.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Runs `fut` to completion unless the signal fires first.
    ///
    /// The signal is checked before `fut` is polled for the first time, so
    /// a pre-triggered signal guarantees `fut` never runs.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Canceled>
    where
        F: Future,
    {
        self.check()?;
        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(Canceled),
            output = fut => Ok(output),
        }
    }

    /// Returns the underlying token, e.g. to hand to other tokio-aware code.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for Cancellation {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}
