// ABOUTME: Profile input for the vitacrew CLI: JSON file or built-in sample form submission
// ABOUTME: Validates the raw fields and computes metrics before any stage runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;
use vitacrew::errors::{AppError, AppResult};
use vitacrew_core::models::{HealthMetrics, UserProfile};
use vitacrew_core::validation::validate;
use vitacrew_intelligence::MetricsEngine;

use crate::RunArgs;

/// Where the profile comes from and how metrics are computed
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub path: Option<PathBuf>,
    pub calories: Option<f64>,
    pub goal: Option<String>,
}

impl From<&RunArgs> for ProfileInput {
    fn from(args: &RunArgs) -> Self {
        Self {
            path: args.input.clone(),
            calories: args.calories,
            goal: args.goal.clone(),
        }
    }
}

/// Form submission used when no input file is given
pub fn sample_input() -> Value {
    json!({
        "name": "Test User",
        "age": 30,
        "gender": "MALE",
        "height": 175.0,
        "weight": 70.0,
        "waist_circumference": 80.0,
        "hip_circumference": 90.0,
        "fitness_objectives": ["weight loss", "muscle gain"],
        "dietary_requirements": ["none"],
        "skin_type": "DRY",
        "skin_concerns": ["none"],
        "sleep_hours": 7.5,
        "stress_level": "MODERATE",
        "activity_level": "MODERATE"
    })
}

async fn read_raw(path: &Path) -> AppResult<Value> {
    let json = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::storage(format!("Cannot read profile {}: {e}", path.display())).with_source(e)
    })?;
    Ok(serde_json::from_str(&json)?)
}

/// Validate the profile and compute its metrics
pub async fn load_profile(input: &ProfileInput) -> AppResult<(UserProfile, HealthMetrics)> {
    let raw = match &input.path {
        Some(path) => read_raw(path).await?,
        None => {
            info!("No input file given; using the sample profile");
            sample_input()
        }
    };

    let profile = validate(&raw)?;
    let metrics = MetricsEngine::global().compute_health_metrics(
        &profile,
        input.calories,
        input.goal.as_deref(),
    )?;
    Ok((profile, metrics))
}
