// ABOUTME: Sequential stage pipeline: runner, run records, run control and progress events
// ABOUTME: The runner depends only on the StageExecutor trait, never on a concrete agent backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Stage Pipeline
//!
//! A [`PipelineRunner`] executes the active stages of a [`crate::stages::StageRegistry`]
//! one after another. Each stage receives the validated profile, the computed
//! metrics and the outputs of every stage that ran before it in the same
//! run. Outputs are appended in execution order and never modified.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vitacrew::agents::DryRunExecutor;
//! use vitacrew::pipeline::{PipelineRunner, RunControl};
//! use vitacrew::stages::StageRegistry;
//! use vitacrew_core::validation::validate;
//! use vitacrew_intelligence::compute_health_metrics;
//!
//! # async fn example(raw: serde_json::Value) -> vitacrew::errors::AppResult<()> {
//! let profile = validate(&raw)?;
//! let metrics = compute_health_metrics(&profile, None, None)?;
//! let runner = PipelineRunner::new(
//!     Arc::new(StageRegistry::builtin()?),
//!     Arc::new(DryRunExecutor::new()),
//! );
//! let run = runner.run_all(profile, metrics, &RunControl::new()).await?;
//! println!("{}", run.to_json()?);
//! # Ok(())
//! # }
//! ```

mod control;
mod error;
mod events;
mod executor;
mod run;
mod runner;

pub use control::{InterruptReason, RunControl};
pub use error::PipelineError;
pub use events::{channel as event_channel, EventReceiver, EventSender, StageEvent};
pub use executor::{StageExecutor, StageInput};
pub use run::{PipelineRun, StageOutput};
pub use runner::PipelineRunner;
