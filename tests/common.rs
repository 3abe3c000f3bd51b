// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Sample profiles, small stage catalogs and a scriptable stage executor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `vitacrew`

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use vitacrew::errors::{AppError, AppResult};
use vitacrew::pipeline::{StageExecutor, StageInput};
use vitacrew::stages::{AgentDefinition, StageDefinition, StageRegistry};
use vitacrew_core::models::{HealthMetrics, UserProfile};
use vitacrew_core::validation::validate;
use vitacrew_intelligence::MetricsEngine;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Raw form submission matching the CLI sample profile
pub fn sample_raw() -> Value {
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

/// Validated sample profile
pub fn sample_profile() -> UserProfile {
    validate(&sample_raw()).expect("sample profile is valid")
}

/// Validated sample profile with its default metrics
pub fn sample_inputs() -> (UserProfile, HealthMetrics) {
    let profile = sample_profile();
    let metrics = MetricsEngine::global()
        .compute_health_metrics(&profile, None, None)
        .unwrap();
    (profile, metrics)
}

/// Catalog of `count` active stages `s1..sN`, all delegated to role `worker`
pub fn linear_registry(count: u32) -> StageRegistry {
    let agents = vec![AgentDefinition::new(
        "worker",
        "Worker",
        "Do the work",
        "Has done this before",
    )];
    let stages = (1..=count)
        .map(|ordinal| {
            StageDefinition::new(
                format!("s{ordinal}"),
                ordinal,
                "worker",
                format!("Stage {ordinal} for {{name}}"),
            )
        })
        .collect();
    StageRegistry::new(agents, stages).unwrap()
}

/// Catalog with active `s1`, inactive `s2` and active `s3`
pub fn registry_with_inactive() -> StageRegistry {
    let agents = vec![AgentDefinition::new("worker", "Worker", "goal", "story")];
    let stages = vec![
        StageDefinition::new("s1", 1, "worker", "first"),
        StageDefinition::new("s2", 2, "worker", "second").inactive(),
        StageDefinition::new("s3", 3, "worker", "third"),
    ];
    StageRegistry::new(agents, stages).unwrap()
}

/// What the scripted executor saw for one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub stage_id: String,
    pub prior_stage_ids: Vec<String>,
}

/// Executor whose behaviour is scripted per stage
///
/// Succeeds with `{"stage": id, "prior": n}` unless the stage is listed as
/// failing or hanging.
#[derive(Default)]
pub struct ScriptedExecutor {
    fail_on: HashSet<String>,
    hang_on: HashSet<String>,
    cancel_on: Option<String>,
    delay: Option<Duration>,
    records: Mutex<Vec<ExecutionRecord>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with an external service error at `stage_id`
    pub fn failing_on(mut self, stage_id: &str) -> Self {
        self.fail_on.insert(stage_id.to_owned());
        self
    }

    /// Never return from `stage_id`
    pub fn hanging_on(mut self, stage_id: &str) -> Self {
        self.hang_on.insert(stage_id.to_owned());
        self
    }

    /// Cancel the run's token from inside `stage_id`, then hang
    pub fn cancelling_on(mut self, stage_id: &str) -> Self {
        self.cancel_on = Some(stage_id.to_owned());
        self
    }

    /// Sleep before every stage
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn records(&self) -> Vec<ExecutionRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn executed_ids(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .map(|record| record.stage_id)
            .collect()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl StageExecutor for ScriptedExecutor {
    async fn execute(&self, input: StageInput<'_>) -> AppResult<Value> {
        let stage_id = input.stage.stage_id.clone();
        self.records.lock().unwrap().push(ExecutionRecord {
            stage_id: stage_id.clone(),
            prior_stage_ids: input
                .prior_outputs
                .iter()
                .map(|output| output.stage_id.clone())
                .collect(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.cancel_on.as_deref() == Some(stage_id.as_str()) {
            input.control.cancel();
            std::future::pending::<()>().await;
        }
        if self.hang_on.contains(&stage_id) {
            std::future::pending::<()>().await;
        }
        if self.fail_on.contains(&stage_id) {
            return Err(AppError::external_service(
                "scripted",
                format!("stage {stage_id} exploded"),
            ));
        }
        Ok(json!({ "stage": stage_id, "prior": input.prior_outputs.len() }))
    }
}
