//! Per-operation context: cancellation and deadline.
//!
//! Every [`Sln`](crate::Sln) operation takes a [`Context`]. Operations
//! check it before doing any work and give up with `Error::Cancelled` or
//! `Error::DeadlineExceeded` once it is done.

use std::future::pending;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::{Error, Result};

// ============================================================================
// Context
// ============================================================================

/// Cancellation signal plus optional deadline.
///
/// `Context::background()` is never cancelled and has no deadline.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel_rx: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn background() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now. Keeps an earlier existing deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Expire at `deadline`. Keeps an earlier existing deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        self
    }

    /// Listen to a cancellation signal from a [`CancellationHandle`].
    pub fn with_cancellation(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Why the context is done, or `None` if it is still live.
    pub fn err(&self) -> Option<Error> {
        if self.is_cancelled() {
            Some(Error::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(Error::DeadlineExceeded)
        } else {
            None
        }
    }

    /// `Ok` while the context is live.
    pub fn check(&self) -> Result<()> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Resolve once the context is cancelled or its deadline passes.
    /// Never resolves for a background context.
    pub async fn done(&self) {
        let cancelled = async {
            match self.cancel_rx.clone() {
                Some(mut rx) => {
                    // A dropped handle can no longer cancel.
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        pending::<()>().await;
                    }
                }
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };
        tokio::select! {
            _ = cancelled => {}
            _ = expired => {}
        }
    }
}

// ============================================================================
// Cancellation Handle
// ============================================================================

/// Sender side of a context's cancellation signal.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    cancel_tx: watch::Sender<bool>,
}

impl CancellationHandle {
    /// Create a handle and the receiver to give to [`Context::with_cancellation`].
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { cancel_tx: tx }, rx)
    }

    /// A live context cancelled by this handle.
    pub fn context(&self) -> Context {
        Context::background().with_cancellation(self.cancel_tx.subscribe())
    }

    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = Context::background();
        assert!(!ctx.is_cancelled());
        assert_eq!(ctx.check(), Ok(()));
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_cancellation() {
        let (handle, rx) = CancellationHandle::new();
        let ctx = Context::background().with_cancellation(rx);
        assert!(!ctx.is_cancelled());
        handle.cancel();
        assert!(ctx.is_cancelled());
        assert!(handle.is_cancelled());
        assert_eq!(ctx.check(), Err(Error::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_secs(5));
        assert_eq!(ctx.check(), Ok(()));
        ctx.done().await;
        assert_eq!(ctx.check(), Err(Error::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_deadline_wins() {
        let ctx = Context::background()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(60));
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(ctx.err(), Some(Error::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_done_on_cancel() {
        let handle = CancellationHandle::default();
        let ctx = handle.context();
        let waiter = tokio::spawn(async move { ctx.done().await });
        handle.cancel();
        waiter.await.unwrap();
    }
}
