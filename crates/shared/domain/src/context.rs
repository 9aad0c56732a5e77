//! Per-request cancellation context.
//!
//! Every operation on every layer takes a [`RequestContext`] and checks it
//! once on entry. The check never blocks and never interrupts I/O that is
//! already in flight.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::{DomainError, DomainResult};

/// Cancellation signal and optional deadline for one inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context with no deadline that is never cancelled unless asked to.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context expiring `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Attach an optional timeout measured from now.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.deadline = timeout.map(|t| Instant::now() + t);
        self
    }

    /// Context cancelled together with `parent`, typically a process-wide
    /// shutdown token.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self {
            cancel: parent.child_token(),
            deadline: None,
        }
    }

    /// Cancel the request.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Non-blocking cancellation check.
    pub fn check(&self) -> DomainResult<()> {
        if self.cancel.is_cancelled() {
            return Err(DomainError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DomainError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
