// ABOUTME: Contract between the pipeline runner and the agent-execution collaborator
// ABOUTME: StageInput bundles the stage, its agent, profile, metrics, prior outputs and run control
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use async_trait::async_trait;
use serde_json::Value;
use vitacrew_core::models::{HealthMetrics, UserProfile};

use super::control::RunControl;
use super::run::StageOutput;
use crate::errors::AppResult;
use crate::stages::{AgentDefinition, StageDefinition};

/// Everything a stage executor may read; nothing here can be mutated
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    /// Stage being executed
    pub stage: &'a StageDefinition,
    /// Agent the stage is delegated to
    pub agent: &'a AgentDefinition,
    /// Validated profile
    pub profile: &'a UserProfile,
    /// Metrics computed for the profile
    pub metrics: &'a HealthMetrics,
    /// Outputs of stages completed earlier in this run, in execution order
    pub prior_outputs: &'a [StageOutput],
    /// Caller's cancellation token and deadline
    pub control: &'a RunControl,
}

/// Performs the actual work of a stage
///
/// The runner treats the returned value as opaque. Retries, if any, are the
/// executor's business; the runner never retries.
#[async_trait]
pub trait StageExecutor: Send + Sync {
    /// Produce the output of one stage
    async fn execute(&self, input: StageInput<'_>) -> AppResult<Value>;
}
