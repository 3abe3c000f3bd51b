// ABOUTME: Main library entry point for the VitaCrew wellness plan pipeline
// ABOUTME: Stage catalog, sequential pipeline runner and the agent executors that perform stage work
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

#![deny(unsafe_code)]

//! # VitaCrew
//!
//! Turns a user's biometric and lifestyle form into a wellness plan.
//!
//! ## Flow
//!
//! 1. Raw form fields are validated into an immutable `UserProfile`
//!    (`vitacrew_core::validation`)
//! 2. Health metrics are computed once from the profile
//!    (`vitacrew_intelligence::MetricsEngine`)
//! 3. The [`pipeline::PipelineRunner`] hands profile, metrics and earlier
//!    outputs to each active stage of the [`stages::StageRegistry`], in
//!    ordinal order, through a [`pipeline::StageExecutor`]
//!
//! ## Architecture
//!
//! - **Stages**: immutable catalog of stages and the agent roles they are
//!   delegated to, loaded from YAML
//! - **Pipeline**: runner, run records, cancellation/deadline control and
//!   progress events
//! - **Agents**: executors; a language-model executor with calculator tools
//!   and an offline dry-run executor
//! - **LLM**: provider abstraction and an OpenAI-compatible client
//! - **Tools**: calculator tools agents may call
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vitacrew::config::VitacrewConfig;
//! use vitacrew::errors::AppResult;
//! use vitacrew::stages::StageRegistry;
//!
//! fn main() -> AppResult<()> {
//!     let config = VitacrewConfig::from_env()?;
//!     let registry = StageRegistry::load(&config.pipeline)?;
//!     for stage in registry.active_stages() {
//!         println!("{} {} -> {}", stage.ordinal, stage.stage_id, stage.delegated_role);
//!     }
//!     Ok(())
//! }
//! ```

/// Stage executors and prompt rendering
pub mod agents;

/// Environment configuration
pub mod config;

/// Unified error handling re-exported from `vitacrew-core`, plus pipeline errors
pub mod errors;

/// LLM provider abstraction and the OpenAI-compatible client
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// Sequential stage pipeline
pub mod pipeline;

/// Stage and agent catalog
pub mod stages;

/// Calculator tools available to agents
pub mod tools;
