//! Per-call cancellation and deadline.
//!
//! Every capability method takes a [`Context`]. The request future is raced
//! against the context, so a canceled or expired call surfaces
//! [`ScmError::Canceled`] or [`ScmError::DeadlineExceeded`] instead of a
//! partial result.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::ScmError;

/// Cancellation signal and optional deadline for one or more calls.
///
/// Cloning a context shares its cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`Context`] derived from the one that created it.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    /// Signals cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl Context {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a context that expires `timeout` from now, or at the current
    /// deadline if that is earlier.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns a context that expires at `deadline`, or at the current
    /// deadline if that is earlier.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Returns a cancelable context and the handle that cancels it.
    ///
    /// Replaces any cancellation signal this context already carried.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle(tx))
    }

    /// The deadline, if one is set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` once the context has been canceled.
    pub fn is_canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Runs `fut` to completion unless the context is canceled or expires
    /// first, in which case `fut` is dropped.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ScmError>
    where
        F: Future<Output = Result<T, ScmError>>,
    {
        if self.is_canceled() {
            return Err(ScmError::Canceled);
        }
        if self.deadline.is_some_and(|at| at <= Instant::now()) {
            return Err(ScmError::DeadlineExceeded);
        }

        let canceled = wait_canceled(self.cancel.clone());
        let expired = wait_deadline(self.deadline);
        tokio::select! {
            biased;
            _ = canceled => Err(ScmError::Canceled),
            _ = expired => Err(ScmError::DeadlineExceeded),
            out = fut => out,
        }
    }
}

async fn wait_canceled(cancel: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = cancel else {
        return std::future::pending().await;
    };
    loop {
        let canceled = *rx.borrow_and_update();
        if canceled {
            return;
        }
        // Sender dropped without canceling: never fires.
        if rx.changed().await.is_err() {
            return std::future::pending().await;
        }
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
