// ABOUTME: Caller-owned run control passed through a pipeline run to the stage executor
// ABOUTME: Combines a cancellation token with an optional deadline; the runner adds no timeout of its own
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a run stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptReason {
    /// The cancellation token was triggered
    Cancelled,
    /// The deadline passed
    DeadlineExceeded,
}

impl fmt::Display for InterruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled by caller"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Cancellation token plus optional deadline
///
/// Cloning shares the token: cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RunControl {
    /// Control with a fresh token and no deadline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Control driven by an existing token (e.g. one cancelled on Ctrl-C)
    #[must_use]
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Stop the run once `deadline` passes
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stop the run once `timeout` has elapsed from now
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The cancellation token
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if any
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel the run
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check without waiting whether the run must stop
    ///
    /// # Errors
    ///
    /// Returns the reason when the token is cancelled or the deadline passed.
    pub fn check(&self) -> Result<(), InterruptReason> {
        if self.token.is_cancelled() {
            return Err(InterruptReason::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(InterruptReason::DeadlineExceeded);
        }
        Ok(())
    }

    /// Resolve once the run must stop
    ///
    /// Never resolves when the token is never cancelled and there is no deadline.
    pub async fn interrupted(&self) -> InterruptReason {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    () = self.token.cancelled() => InterruptReason::Cancelled,
                    () = tokio::time::sleep_until(deadline) => InterruptReason::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                InterruptReason::Cancelled
            }
        }
    }
}
