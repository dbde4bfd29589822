//! Cancellation - explicit cancel plus optional deadline

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::DispatchError;

/// Cooperative cancellation signal for a dispatch run.
///
/// Combines a `CancellationToken` with an optional deadline. The dispatcher
/// checks it between batches and races every wait against it, so a cancel
/// or an expired deadline never has to sit out a full backoff.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// Cancellation driven by `token`
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// A signal nobody else holds; only a deadline can stop it
    pub fn never() -> Self {
        Self::default()
    }

    /// Add a deadline. The earlier of two deadlines wins.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Add a deadline `timeout` from now
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Trigger the underlying token
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Non-blocking check
    ///
    /// # Errors
    /// `Cancelled` if the token fired, `DeadlineExceeded` if the deadline passed
    pub fn check(&self) -> Result<(), DispatchError> {
        if self.token.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DispatchError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Wait for `duration` unless cancelled first
    pub async fn sleep(&self, duration: Duration) -> Result<(), DispatchError> {
        self.sleep_until(Instant::now() + duration).await
    }

    /// Wait until `until` unless cancelled first
    ///
    /// Returns as soon as the token fires or the deadline passes, whichever
    /// comes before `until`.
    pub async fn sleep_until(&self, until: Instant) -> Result<(), DispatchError> {
        self.check()?;

        match self.deadline {
            Some(deadline) if deadline < until => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Err(DispatchError::Cancelled),
                    _ = tokio::time::sleep_until(deadline) => Err(DispatchError::DeadlineExceeded),
                }
            }
            _ => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Err(DispatchError::Cancelled),
                    _ = tokio::time::sleep_until(until) => Ok(()),
                }
            }
        }
    }
}

impl From<CancellationToken> for Cancellation {
    fn from(token: CancellationToken) -> Self {
        Self::new(token)
    }
}
