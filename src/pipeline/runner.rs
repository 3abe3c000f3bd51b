// ABOUTME: Sequential pipeline runner executing catalog stages through a StageExecutor
// ABOUTME: Supports full runs, single-stage runs and resuming a stored run from a stage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, field, info, info_span, warn, Instrument};
use vitacrew_core::models::{HealthMetrics, UserProfile};

use super::control::{InterruptReason, RunControl};
use super::error::PipelineError;
use super::events::{EventSender, StageEvent};
use super::executor::{StageExecutor, StageInput};
use super::run::{PipelineRun, StageOutput};
use crate::errors::AppError;
use crate::stages::{StageDefinition, StageRegistry};

/// Why a single stage did not produce an output
enum StageFault {
    Failed(AppError),
    Interrupted(InterruptReason),
}

/// Runs stages one at a time, in ascending ordinal order
///
/// The runner holds no per-run state, so one instance can drive any number
/// of independent runs concurrently.
#[derive(Clone)]
pub struct PipelineRunner {
    registry: Arc<StageRegistry>,
    executor: Arc<dyn StageExecutor>,
    events: Option<EventSender>,
}

impl PipelineRunner {
    /// Create a runner over a catalog and an executor
    #[must_use]
    pub fn new(registry: Arc<StageRegistry>, executor: Arc<dyn StageExecutor>) -> Self {
        Self {
            registry,
            executor,
            events: None,
        }
    }

    /// Report stage progress on `sender`
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    /// Catalog the runner executes
    #[must_use]
    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Execute every active stage for one profile
    ///
    /// # Errors
    ///
    /// Returns `StageExecution` when a stage fails and `Interrupted` when the
    /// control is cancelled or its deadline passes. Both carry the run with
    /// the outputs of every stage completed before the stop.
    pub async fn run_all(
        &self,
        profile: UserProfile,
        metrics: HealthMetrics,
        control: &RunControl,
    ) -> Result<PipelineRun, PipelineError> {
        let run = PipelineRun::new(profile, metrics);
        info!(
            run_id = %run.run_id(),
            stages = self.registry.active_stages().count(),
            "Starting pipeline run"
        );
        self.run_stages(run, 0, control).await
    }

    /// Execute one active stage in isolation
    ///
    /// Predecessors are not run; the stage sees no prior outputs.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InactiveStage` without executing anything,
    /// `StageFailed` when the executor fails and `Interrupted` when the
    /// control stops the stage.
    pub async fn run_one(
        &self,
        stage_id: &str,
        profile: &UserProfile,
        metrics: &HealthMetrics,
        control: &RunControl,
    ) -> Result<StageOutput, PipelineError> {
        let stage = self.registry.active_stage(stage_id)?;
        self.execute_stage(stage, profile, metrics, &[], control)
            .await
            .map_err(|fault| match fault {
                StageFault::Failed(source) => PipelineError::StageFailed {
                    stage_id: stage.stage_id.clone(),
                    source,
                },
                StageFault::Interrupted(reason) => PipelineError::Interrupted {
                    stage_id: stage.stage_id.clone(),
                    reason,
                    partial: None,
                },
            })
    }

    /// Re-execute a stored run from `stage_id` onward
    ///
    /// Outputs of stages ordered before `stage_id` are kept and handed to the
    /// re-executed stages as prior outputs; later outputs are discarded.
    ///
    /// # Errors
    ///
    /// As [`PipelineRunner::run_all`], plus `NotFound` / `InactiveStage` for
    /// the starting stage.
    pub async fn resume_from(
        &self,
        mut run: PipelineRun,
        stage_id: &str,
        control: &RunControl,
    ) -> Result<PipelineRun, PipelineError> {
        let ordinal = self.registry.active_stage(stage_id)?.ordinal;
        run.rewind_to(ordinal);
        info!(
            run_id = %run.run_id(),
            stage_id,
            kept_outputs = run.stage_outputs().len(),
            "Resuming pipeline run"
        );
        self.run_stages(run, ordinal, control).await
    }

    /// Execute the active stages with an ordinal of at least `from_ordinal`
    async fn run_stages(
        &self,
        mut run: PipelineRun,
        from_ordinal: u32,
        control: &RunControl,
    ) -> Result<PipelineRun, PipelineError> {
        for stage in self
            .registry
            .active_stages()
            .filter(|stage| stage.ordinal >= from_ordinal)
        {
            let result = self
                .execute_stage(
                    stage,
                    run.profile(),
                    run.metrics(),
                    run.stage_outputs(),
                    control,
                )
                .await;

            match result {
                Ok(output) => run.push(output),
                Err(StageFault::Failed(source)) => {
                    return Err(PipelineError::StageExecution {
                        stage_id: stage.stage_id.clone(),
                        run: Box::new(run),
                        source,
                    });
                }
                Err(StageFault::Interrupted(reason)) => {
                    return Err(PipelineError::Interrupted {
                        stage_id: stage.stage_id.clone(),
                        reason,
                        partial: Some(Box::new(run)),
                    });
                }
            }
        }

        run.mark_completed();
        info!(
            run_id = %run.run_id(),
            completed_stages = run.stage_outputs().len(),
            "Pipeline run completed"
        );
        Ok(run)
    }

    /// Execute one stage, racing it against the run control
    async fn execute_stage(
        &self,
        stage: &StageDefinition,
        profile: &UserProfile,
        metrics: &HealthMetrics,
        prior_outputs: &[StageOutput],
        control: &RunControl,
    ) -> Result<StageOutput, StageFault> {
        if let Err(reason) = control.check() {
            warn!(stage_id = %stage.stage_id, %reason, "Run stopped before stage started");
            self.emit_failed(stage, &reason.to_string());
            return Err(StageFault::Interrupted(reason));
        }

        let agent = self
            .registry
            .agent(&stage.delegated_role)
            .ok_or_else(|| {
                StageFault::Failed(AppError::internal(format!(
                    "No agent defined for role '{}'",
                    stage.delegated_role
                )))
            })?;

        let span = info_span!(
            "stage",
            stage_id = %stage.stage_id,
            ordinal = stage.ordinal,
            role = %stage.delegated_role,
            duration_ms = field::Empty,
            success = field::Empty,
        );

        self.emit(StageEvent::Started {
            stage_id: stage.stage_id.clone(),
            ordinal: stage.ordinal,
            role: stage.delegated_role.clone(),
        });

        let input = StageInput {
            stage,
            agent,
            profile,
            metrics,
            prior_outputs,
            control,
        };

        let started = Instant::now();
        let result = async {
            debug!(prior_outputs = prior_outputs.len(), "Executing stage");
            tokio::select! {
                biased;
                reason = control.interrupted() => Err(StageFault::Interrupted(reason)),
                result = self.executor.execute(input) => result.map_err(StageFault::Failed),
            }
        }
        .instrument(span.clone())
        .await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        span.record("duration_ms", duration_ms)
            .record("success", result.is_ok());

        match result {
            Ok(value) => {
                span.in_scope(|| info!(duration_ms, "Stage completed"));
                self.emit(StageEvent::Completed {
                    stage_id: stage.stage_id.clone(),
                    duration_ms,
                });
                Ok(StageOutput {
                    stage_id: stage.stage_id.clone(),
                    ordinal: stage.ordinal,
                    delegated_role: stage.delegated_role.clone(),
                    value,
                    duration_ms,
                    completed_at: Utc::now(),
                })
            }
            Err(fault) => {
                let message = match &fault {
                    StageFault::Failed(error) => error.to_string(),
                    StageFault::Interrupted(reason) => reason.to_string(),
                };
                span.in_scope(|| warn!(error = %message, "Stage did not complete"));
                self.emit_failed(stage, &message);
                Err(fault)
            }
        }
    }

    fn emit_failed(&self, stage: &StageDefinition, error: &str) {
        self.emit(StageEvent::Failed {
            stage_id: stage.stage_id.clone(),
            error: error.to_owned(),
        });
    }

    fn emit(&self, event: StageEvent) {
        if let Some(sender) = &self.events {
            if sender.send(event).is_err() {
                debug!("Progress receiver dropped; event discarded");
            }
        }
    }
}
