// ABOUTME: Core types for the VitaCrew wellness planner
// ABOUTME: Foundation crate with error handling, profile models, constants and input validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

#![deny(unsafe_code)]

//! # VitaCrew Core
//!
//! Foundation crate shared by the metrics engine and the stage pipeline.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, `ValidationError` and `ToolError`
//! - **constants**: Validation bounds and canonical field names
//! - **models**: `UserProfile`, categorical vocabularies and `HealthMetrics`
//! - **validation**: The only constructor of `UserProfile`

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models
pub mod models;

/// Raw form submission to `UserProfile` validation
pub mod validation;
