// ABOUTME: Offline stage executor returning the rendered stage prompt instead of calling a model
// ABOUTME: Used by `vitacrew run --dry-run` and by tests exercising the full pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use async_trait::async_trait;
use serde_json::{json, Value};

use super::prompt::{placeholder_values, render_template};
use crate::errors::AppResult;
use crate::pipeline::{StageExecutor, StageInput};

/// Executor that performs no network calls
///
/// Each output records the agent, the rendered task and which earlier
/// stages the task would have seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunExecutor;

impl DryRunExecutor {
    /// Create the executor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StageExecutor for DryRunExecutor {
    async fn execute(&self, input: StageInput<'_>) -> AppResult<Value> {
        let values = placeholder_values(input.profile, input.metrics);
        let prior_stages: Vec<&str> = input
            .prior_outputs
            .iter()
            .map(|output| output.stage_id.as_str())
            .collect();

        Ok(json!({
            "agent": input.agent.display_name,
            "task": render_template(&input.stage.description_template, &values),
            "expected_output": render_template(&input.stage.expected_output, &values),
            "prior_stages": prior_stages,
        }))
    }
}
