// ABOUTME: Health metrics engine for the VitaCrew wellness planner
// ABOUTME: Harris-Benedict BMR, activity-based calorie target and goal-driven macro split
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

#![deny(unsafe_code)]

//! # VitaCrew Intelligence
//!
//! Pure, deterministic computations over a validated `UserProfile`. All
//! coefficients live in [`config::MetricsConfig`].

/// Coefficients, ratio tables and their validation
pub mod config;

/// BMR, calorie target and macronutrient computations
pub mod metrics;

pub use config::{ConfigError, MetricsConfig};
pub use metrics::{compute_bmr, compute_health_metrics, compute_macros, MetricsEngine};
