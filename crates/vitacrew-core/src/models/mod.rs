// ABOUTME: Domain models for the VitaCrew wellness planner
// ABOUTME: Re-exports the user profile, categorical vocabularies and health metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Data Models
//!
//! - `UserProfile`: validated biometric and preference record
//! - Vocabularies: closed sets of categorical values (`Gender`, `FitnessObjective`, ...)
//! - `HealthMetrics`: derived BMR, calorie target and macro split

mod metrics;
mod profile;
mod vocabulary;

pub use metrics::{HealthMetrics, MacroTargets};
pub use profile::UserProfile;
pub use vocabulary::{
    ActivityLevel, DietaryRequirement, FitnessObjective, Gender, Goal, SkinConcern, SkinType,
    StressLevel, UnknownValue,
};
