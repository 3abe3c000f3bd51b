// ABOUTME: Configuration module for the VitaCrew root crate
// ABOUTME: Re-exports environment settings; metrics coefficients live in vitacrew-intelligence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! Configuration
//!
//! - **Environment**: LLM endpoint, tool loop and catalog path ([`VitacrewConfig`])
//! - **Metrics**: coefficients and ratio tables ([`MetricsConfig`], re-exported)

/// Environment variable configuration
pub mod environment;

pub use environment::{Environment, LlmSettings, PipelineSettings, VitacrewConfig};
pub use vitacrew_intelligence::MetricsConfig;
