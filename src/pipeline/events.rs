// ABOUTME: Progress events emitted by the pipeline runner while stages execute
// ABOUTME: Delivered over an unbounded tokio mpsc channel; a dropped receiver is ignored
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Sending half handed to [`super::PipelineRunner::with_events`]
pub type EventSender = mpsc::UnboundedSender<StageEvent>;

/// Receiving half consumed by progress reporters
pub type EventReceiver = mpsc::UnboundedReceiver<StageEvent>;

/// Stage lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StageEvent {
    /// Stage handed to the executor
    Started {
        /// Stage id
        stage_id: String,
        /// Stage ordinal
        ordinal: u32,
        /// Delegated role
        role: String,
    },
    /// Stage output recorded
    Completed {
        /// Stage id
        stage_id: String,
        /// Execution time
        duration_ms: u64,
    },
    /// Stage failed or was interrupted
    Failed {
        /// Stage id
        stage_id: String,
        /// Error message
        error: String,
    },
}

impl StageEvent {
    /// Stage the event is about
    #[must_use]
    pub fn stage_id(&self) -> &str {
        match self {
            Self::Started { stage_id, .. }
            | Self::Completed { stage_id, .. }
            | Self::Failed { stage_id, .. } => stage_id,
        }
    }
}

/// Create a progress channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
