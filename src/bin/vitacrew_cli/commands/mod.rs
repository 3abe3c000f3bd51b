// ABOUTME: Command implementations for the vitacrew CLI
// ABOUTME: Shared context plus executor and runner construction used by every command
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

pub mod catalog;
pub mod run;
pub mod training;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;
use vitacrew::{
    agents::{DryRunExecutor, LlmStageExecutor},
    config::VitacrewConfig,
    errors::AppResult,
    pipeline::{event_channel, PipelineRunner, RunControl, StageExecutor},
    stages::StageRegistry,
};

use crate::helpers::{display::spawn_progress_reporter, signal::cancel_on_ctrl_c};

/// State loaded once at start-up
pub struct Context {
    pub config: VitacrewConfig,
    pub registry: Arc<StageRegistry>,
}

impl Context {
    /// Dry-run executor or the configured model executor
    pub fn executor(&self, dry_run: bool, model: Option<&str>) -> AppResult<Arc<dyn StageExecutor>> {
        if dry_run {
            return Ok(Arc::new(DryRunExecutor::new()));
        }
        let mut executor = LlmStageExecutor::from_config(&self.config)?;
        if let Some(model) = model {
            executor = executor.with_model(model);
        }
        Ok(Arc::new(executor))
    }

    /// Runner reporting progress on stderr
    ///
    /// The reporter task ends once the runner (and with it the sender) is dropped.
    pub fn runner(&self, executor: Arc<dyn StageExecutor>) -> (PipelineRunner, JoinHandle<()>) {
        let (sender, receiver) = event_channel();
        let runner = PipelineRunner::new(Arc::clone(&self.registry), executor).with_events(sender);
        (runner, spawn_progress_reporter(receiver))
    }
}

/// Drop the runner and wait for its progress reporter to drain
pub async fn finish_reporter(runner: PipelineRunner, reporter: JoinHandle<()>) {
    drop(runner);
    if reporter.await.is_err() {
        warn!("Progress reporter task ended abnormally");
    }
}

/// Run control cancelled on Ctrl-C, with an optional timeout
pub fn run_control(timeout_secs: Option<u64>) -> RunControl {
    let control = RunControl::new();
    cancel_on_ctrl_c(control.token().clone());
    match timeout_secs {
        Some(secs) => control.with_timeout(Duration::from_secs(secs)),
        None => control,
    }
}
