// ABOUTME: Error types for the VitaCrew root crate
// ABOUTME: Re-exports the unified core errors alongside the pipeline and catalog errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Unified Error Handling System
//!
//! The error taxonomy lives in `vitacrew-core`. This module re-exports it so
//! the root crate and its binary can write `crate::errors::AppResult`, and
//! gathers the typed errors raised by the root crate's own modules:
//!
//! - [`PipelineError`]: stage lookup, stage failure and interruption
//! - [`CatalogError`]: stage catalog loading and validation
//! - [`ValidationError`]: raw profile input rejected field by field
//!
//! All of them convert into [`AppError`], whose [`ErrorCode`] decides the
//! CLI exit status.

pub use vitacrew_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ToolError, ValidationError,
};
pub use vitacrew_intelligence::ConfigError;

pub use crate::pipeline::PipelineError;
pub use crate::stages::CatalogError;
