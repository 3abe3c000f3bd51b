// ABOUTME: Stage executors: the language-model agent executor and an offline dry-run executor
// ABOUTME: Also hosts prompt rendering shared by both
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Agents
//!
//! Implementations of [`crate::pipeline::StageExecutor`]. The pipeline only
//! sees the trait; which executor runs is decided by the binary.

mod dry_run;
mod llm_executor;

/// Template rendering and prompt assembly
pub mod prompt;

pub use dry_run::DryRunExecutor;
pub use llm_executor::{LlmStageExecutor, DEFAULT_MAX_TOOL_ROUNDS};
