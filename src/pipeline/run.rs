// ABOUTME: Pipeline run record owning the profile, metrics and ordered stage outputs
// ABOUTME: Outputs are append-only while running; runs serialize to JSON for replay
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;
use vitacrew_core::models::{HealthMetrics, UserProfile};

use crate::errors::AppResult;

/// Result of one executed stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    /// Stage that produced the value
    pub stage_id: String,
    /// Ordinal of the stage when it ran
    pub ordinal: u32,
    /// Agent role the stage was delegated to
    pub delegated_role: String,
    /// Value returned by the executor, opaque to the pipeline
    pub value: Value,
    /// Wall-clock execution time
    pub duration_ms: u64,
    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

/// One execution of the pipeline for one profile
///
/// Deserializing a run re-validates the stored profile, so a tampered run
/// file cannot smuggle an out-of-range profile into a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    profile: UserProfile,
    metrics: HealthMetrics,
    #[serde(default)]
    stage_outputs: Vec<StageOutput>,
}

impl PipelineRun {
    /// Start a run with no outputs
    #[must_use]
    pub fn new(profile: UserProfile, metrics: HealthMetrics) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            completed_at: None,
            profile,
            metrics,
            stage_outputs: Vec::new(),
        }
    }

    /// Unique run identifier
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// When the run started
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the last stage finished, `None` while running or after a failure
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Check if every selected stage finished
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Validated profile the run was started for
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Metrics computed for the profile
    #[must_use]
    pub const fn metrics(&self) -> &HealthMetrics {
        &self.metrics
    }

    /// Outputs in execution order
    #[must_use]
    pub fn stage_outputs(&self) -> &[StageOutput] {
        &self.stage_outputs
    }

    /// Output of one stage
    #[must_use]
    pub fn output(&self, stage_id: &str) -> Option<&StageOutput> {
        self.stage_outputs
            .iter()
            .find(|output| output.stage_id == stage_id)
    }

    pub(crate) fn push(&mut self, output: StageOutput) {
        self.stage_outputs.push(output);
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Drop outputs of stages ordered at or after `ordinal` and reopen the run
    pub(crate) fn rewind_to(&mut self, ordinal: u32) {
        self.stage_outputs.retain(|output| output.ordinal < ordinal);
        self.completed_at = None;
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns a serialization error (not expected for well-formed runs).
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a run, re-validating its profile
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON or an invalid profile.
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the run to a JSON file
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> AppResult<()> {
        tokio::fs::write(path, self.to_json()?).await?;
        Ok(())
    }

    /// Read a run from a JSON file
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read, otherwise as
    /// [`PipelineRun::from_json`].
    pub async fn load(path: &Path) -> AppResult<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}
