// ABOUTME: Errors surfaced by the stage registry lookups and the pipeline runner
// ABOUTME: Failures carry the stage id and, for full runs, the partial run completed so far
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use serde_json::json;
use thiserror::Error;

use super::control::InterruptReason;
use super::run::PipelineRun;
use crate::errors::{AppError, ErrorCode};

/// Errors from stage lookup and stage execution
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No stage with this id is defined
    #[error("Stage '{stage_id}' is not defined")]
    NotFound {
        /// Requested stage id
        stage_id: String,
    },
    /// Stage is defined but excluded from execution
    #[error("Stage '{stage_id}' is defined but inactive")]
    InactiveStage {
        /// Requested stage id
        stage_id: String,
    },
    /// A stage failed during a full run; earlier outputs are preserved
    #[error("Stage '{stage_id}' failed after {} completed stage(s): {source}", run.stage_outputs().len())]
    StageExecution {
        /// Failing stage
        stage_id: String,
        /// Run holding the outputs of every stage completed before the failure
        run: Box<PipelineRun>,
        /// Error reported by the executor
        #[source]
        source: AppError,
    },
    /// A single stage run failed
    #[error("Stage '{stage_id}' failed: {source}")]
    StageFailed {
        /// Failing stage
        stage_id: String,
        /// Error reported by the executor
        #[source]
        source: AppError,
    },
    /// The caller cancelled the run or its deadline passed
    #[error("Stage '{stage_id}' interrupted: {reason}")]
    Interrupted {
        /// Stage that was running or about to run
        stage_id: String,
        /// Cancellation or deadline
        reason: InterruptReason,
        /// Outputs completed before the interruption (full runs only)
        partial: Option<Box<PipelineRun>>,
    },
}

impl PipelineError {
    /// Stage the error refers to
    #[must_use]
    pub fn stage_id(&self) -> &str {
        match self {
            Self::NotFound { stage_id }
            | Self::InactiveStage { stage_id }
            | Self::StageExecution { stage_id, .. }
            | Self::StageFailed { stage_id, .. }
            | Self::Interrupted { stage_id, .. } => stage_id,
        }
    }

    /// Partial run preserved by a failed or interrupted full run
    #[must_use]
    pub fn partial_run(&self) -> Option<&PipelineRun> {
        match self {
            Self::StageExecution { run, .. } => Some(run.as_ref()),
            Self::Interrupted { partial, .. } => partial.as_deref(),
            _ => None,
        }
    }

    /// Take ownership of the partial run, if any
    #[must_use]
    pub fn into_partial_run(self) -> Option<PipelineRun> {
        match self {
            Self::StageExecution { run, .. } => Some(*run),
            Self::Interrupted { partial, .. } => partial.map(|run| *run),
            _ => None,
        }
    }

    /// Error code used when converting into `AppError`
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::ResourceNotFound,
            Self::InactiveStage { .. } => ErrorCode::ResourceUnavailable,
            Self::StageExecution { source, .. } | Self::StageFailed { source, .. } => source.code,
            Self::Interrupted { .. } => ErrorCode::OperationInterrupted,
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(error: PipelineError) -> Self {
        let completed: Vec<&str> = error
            .partial_run()
            .map(|run| {
                run.stage_outputs()
                    .iter()
                    .map(|output| output.stage_id.as_str())
                    .collect()
            })
            .unwrap_or_default();
        let details = json!({
            "stage_id": error.stage_id(),
            "completed_stages": completed,
        });
        Self::new(error.code(), error.to_string())
            .with_details(details)
            .with_source(error)
    }
}
