// ABOUTME: Integration tests for the sequential pipeline runner
// ABOUTME: Covers ordering, partial results on failure, single-stage runs, cancellation and resume
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    init_test_logging, linear_registry, registry_with_inactive, sample_inputs, ScriptedExecutor,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vitacrew::agents::DryRunExecutor;
use vitacrew::errors::{AppError, ErrorCode};
use vitacrew::pipeline::{
    event_channel, InterruptReason, PipelineError, PipelineRun, PipelineRunner, RunControl,
    StageEvent, StageExecutor,
};
use vitacrew::stages::StageRegistry;

fn runner_with(registry: StageRegistry, executor: Arc<ScriptedExecutor>) -> PipelineRunner {
    init_test_logging();
    PipelineRunner::new(Arc::new(registry), executor)
}

#[tokio::test]
async fn test_run_all_executes_stages_in_ordinal_order() {
    let executor = ScriptedExecutor::new().into_arc();
    let runner = runner_with(linear_registry(5), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();

    let run = runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap();

    let ids: Vec<&str> = run
        .stage_outputs()
        .iter()
        .map(|output| output.stage_id.as_str())
        .collect();
    assert_eq!(ids, ["s1", "s2", "s3", "s4", "s5"]);
    assert_eq!(executor.executed_ids(), ["s1", "s2", "s3", "s4", "s5"]);
    assert!(run.is_complete());
}

#[tokio::test]
async fn test_each_stage_sees_every_earlier_output() {
    let executor = ScriptedExecutor::new().into_arc();
    let runner = runner_with(linear_registry(3), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();

    let run = runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap();

    let records = executor.records();
    assert!(records[0].prior_stage_ids.is_empty());
    assert_eq!(records[1].prior_stage_ids, ["s1"]);
    assert_eq!(records[2].prior_stage_ids, ["s1", "s2"]);
    assert_eq!(run.output("s3").unwrap().value, json!({"stage": "s3", "prior": 2}));
}

#[tokio::test]
async fn test_inactive_stages_are_skipped_by_full_runs() {
    let executor = ScriptedExecutor::new().into_arc();
    let runner = runner_with(registry_with_inactive(), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();

    runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap();

    assert_eq!(executor.executed_ids(), ["s1", "s3"]);
}

#[tokio::test]
async fn test_failure_at_third_stage_keeps_first_two_outputs() {
    let executor = ScriptedExecutor::new().failing_on("s3").into_arc();
    let runner = runner_with(linear_registry(8), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();

    let error = runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap_err();

    match &error {
        PipelineError::StageExecution {
            stage_id,
            run,
            source,
        } => {
            assert_eq!(stage_id, "s3");
            assert_eq!(run.stage_outputs().len(), 2);
            assert_eq!(run.stage_outputs()[0].stage_id, "s1");
            assert_eq!(run.stage_outputs()[1].stage_id, "s2");
            assert!(!run.is_complete());
            assert_eq!(source.code, ErrorCode::ExternalServiceError);
        }
        other => panic!("expected StageExecution, got {other:?}"),
    }
    assert_eq!(executor.executed_ids(), ["s1", "s2", "s3"]);

    let app: AppError = error.into();
    assert_eq!(app.code, ErrorCode::ExternalServiceError);
    assert_eq!(app.details["stage_id"], "s3");
    assert_eq!(app.details["completed_stages"], json!(["s1", "s2"]));
}

#[tokio::test]
async fn test_run_one_executes_only_that_stage() {
    let executor = ScriptedExecutor::new().into_arc();
    let runner = runner_with(linear_registry(4), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();

    let output = runner
        .run_one("s3", &profile, &metrics, &RunControl::new())
        .await
        .unwrap();

    assert_eq!(output.stage_id, "s3");
    assert_eq!(output.ordinal, 3);
    assert_eq!(output.delegated_role, "worker");
    assert_eq!(executor.executed_ids(), ["s3"]);
    assert!(executor.records()[0].prior_stage_ids.is_empty());
}

#[tokio::test]
async fn test_run_one_unknown_stage_is_not_found() {
    let executor = ScriptedExecutor::new().into_arc();
    let runner = runner_with(linear_registry(2), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();

    let error = runner
        .run_one("cook_dinner", &profile, &metrics, &RunControl::new())
        .await
        .unwrap_err();

    assert!(matches!(error, PipelineError::NotFound { ref stage_id } if stage_id == "cook_dinner"));
    assert!(executor.executed_ids().is_empty());
    assert_eq!(AppError::from(error).code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_run_one_inactive_stage_is_rejected() {
    let executor = ScriptedExecutor::new().into_arc();
    let runner = runner_with(registry_with_inactive(), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();

    let error = runner
        .run_one("s2", &profile, &metrics, &RunControl::new())
        .await
        .unwrap_err();

    assert!(matches!(error, PipelineError::InactiveStage { ref stage_id } if stage_id == "s2"));
    assert!(executor.executed_ids().is_empty());
}

#[tokio::test]
async fn test_run_one_builtin_inactive_stage() {
    init_test_logging();
    let executor = ScriptedExecutor::new().into_arc();
    let registry = Arc::new(StageRegistry::builtin().unwrap());
    let runner = PipelineRunner::new(registry, Arc::clone(&executor) as Arc<dyn StageExecutor>);
    let (profile, metrics) = sample_inputs();

    for stage_id in ["analyze_data", "generate_report"] {
        let error = runner
            .run_one(stage_id, &profile, &metrics, &RunControl::new())
            .await
            .unwrap_err();
        assert!(matches!(error, PipelineError::InactiveStage { .. }));
    }
    assert!(executor.executed_ids().is_empty());
}

#[tokio::test]
async fn test_run_one_failure_is_stage_failed() {
    let executor = ScriptedExecutor::new().failing_on("s1").into_arc();
    let runner = runner_with(linear_registry(1), executor);
    let (profile, metrics) = sample_inputs();

    let error = runner
        .run_one("s1", &profile, &metrics, &RunControl::new())
        .await
        .unwrap_err();

    assert!(matches!(error, PipelineError::StageFailed { .. }));
    assert!(error.partial_run().is_none());
}

#[tokio::test]
async fn test_cancelled_before_start_runs_nothing() {
    let executor = ScriptedExecutor::new().into_arc();
    let runner = runner_with(linear_registry(3), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();
    let control = RunControl::new();
    control.cancel();

    let error = runner.run_all(profile, metrics, &control).await.unwrap_err();

    match error {
        PipelineError::Interrupted {
            stage_id,
            reason,
            partial,
        } => {
            assert_eq!(stage_id, "s1");
            assert_eq!(reason, InterruptReason::Cancelled);
            assert!(partial.unwrap().stage_outputs().is_empty());
        }
        other => panic!("expected Interrupted, got {other:?}"),
    }
    assert!(executor.executed_ids().is_empty());
}

#[tokio::test]
async fn test_cancellation_while_stage_runs_keeps_earlier_outputs() {
    let executor = ScriptedExecutor::new().cancelling_on("s2").into_arc();
    let runner = runner_with(linear_registry(4), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();

    let error = runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap_err();

    assert_eq!(error.stage_id(), "s2");
    let partial = error.into_partial_run().unwrap();
    assert_eq!(partial.stage_outputs().len(), 1);
    assert_eq!(partial.stage_outputs()[0].stage_id, "s1");
    assert_eq!(executor.executed_ids(), ["s1", "s2"]);
}

#[tokio::test]
async fn test_deadline_interrupts_hanging_stage() {
    let executor = ScriptedExecutor::new().hanging_on("s2").into_arc();
    let runner = runner_with(linear_registry(3), executor);
    let (profile, metrics) = sample_inputs();
    let control = RunControl::new().with_timeout(Duration::from_millis(50));

    let error = runner.run_all(profile, metrics, &control).await.unwrap_err();

    match &error {
        PipelineError::Interrupted { reason, .. } => {
            assert_eq!(*reason, InterruptReason::DeadlineExceeded);
        }
        other => panic!("expected Interrupted, got {other:?}"),
    }
    assert_eq!(error.partial_run().unwrap().stage_outputs().len(), 1);
    assert_eq!(AppError::from(error).code, ErrorCode::OperationInterrupted);
}

#[tokio::test]
async fn test_progress_events_follow_stage_lifecycle() {
    let executor = ScriptedExecutor::new().failing_on("s2").into_arc();
    let (sender, mut receiver) = event_channel();
    let runner = runner_with(linear_registry(3), executor).with_events(sender);
    let (profile, metrics) = sample_inputs();

    let _ = runner.run_all(profile, metrics, &RunControl::new()).await;
    drop(runner);

    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }

    assert_eq!(events.len(), 4);
    assert!(matches!(&events[0], StageEvent::Started { stage_id, ordinal: 1, .. } if stage_id == "s1"));
    assert!(matches!(&events[1], StageEvent::Completed { stage_id, .. } if stage_id == "s1"));
    assert!(matches!(&events[2], StageEvent::Started { stage_id, .. } if stage_id == "s2"));
    match &events[3] {
        StageEvent::Failed { stage_id, error } => {
            assert_eq!(stage_id, "s2");
            assert!(error.contains("exploded"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dropped_event_receiver_does_not_fail_run() {
    let (sender, receiver) = event_channel();
    drop(receiver);
    let runner =
        runner_with(linear_registry(2), ScriptedExecutor::new().into_arc()).with_events(sender);
    let (profile, metrics) = sample_inputs();

    let run = runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap();
    assert_eq!(run.stage_outputs().len(), 2);
}

#[tokio::test]
async fn test_resume_from_keeps_prefix_and_reruns_the_rest() {
    let first = ScriptedExecutor::new().failing_on("s3").into_arc();
    let runner = runner_with(linear_registry(4), first);
    let (profile, metrics) = sample_inputs();
    let partial = runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap_err()
        .into_partial_run()
        .unwrap();
    let run_id = partial.run_id();

    let second = ScriptedExecutor::new().into_arc();
    let runner = runner_with(linear_registry(4), Arc::clone(&second));
    let resumed = runner
        .resume_from(partial, "s3", &RunControl::new())
        .await
        .unwrap();

    assert_eq!(resumed.run_id(), run_id);
    assert_eq!(second.executed_ids(), ["s3", "s4"]);
    assert_eq!(second.records()[0].prior_stage_ids, ["s1", "s2"]);
    let ids: Vec<&str> = resumed
        .stage_outputs()
        .iter()
        .map(|output| output.stage_id.as_str())
        .collect();
    assert_eq!(ids, ["s1", "s2", "s3", "s4"]);
    assert!(resumed.is_complete());
}

#[tokio::test]
async fn test_resume_from_discards_outputs_at_and_after_stage() {
    let runner = runner_with(linear_registry(3), ScriptedExecutor::new().into_arc());
    let (profile, metrics) = sample_inputs();
    let complete = runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap();

    let replay = ScriptedExecutor::new().into_arc();
    let runner = runner_with(linear_registry(3), Arc::clone(&replay));
    let resumed = runner
        .resume_from(complete, "s2", &RunControl::new())
        .await
        .unwrap();

    assert_eq!(replay.executed_ids(), ["s2", "s3"]);
    assert_eq!(resumed.stage_outputs().len(), 3);
}

#[tokio::test]
async fn test_resume_from_unknown_stage_is_not_found() {
    let runner = runner_with(linear_registry(2), ScriptedExecutor::new().into_arc());
    let (profile, metrics) = sample_inputs();
    let run = PipelineRun::new(profile, metrics);

    let error = runner
        .resume_from(run, "nope", &RunControl::new())
        .await
        .unwrap_err();
    assert!(matches!(error, PipelineError::NotFound { .. }));
}

#[tokio::test]
async fn test_run_survives_save_and_load() {
    let runner = runner_with(linear_registry(2), ScriptedExecutor::new().into_arc());
    let (profile, metrics) = sample_inputs();
    let run = runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    run.save(&path).await.unwrap();
    let loaded = PipelineRun::load(&path).await.unwrap();

    assert_eq!(loaded, run);
}

#[tokio::test]
async fn test_loading_run_with_invalid_profile_fails() {
    let (profile, metrics) = sample_inputs();
    let run = PipelineRun::new(profile, metrics);
    let mut value: serde_json::Value = serde_json::from_str(&run.to_json().unwrap()).unwrap();
    value["profile"]["age"] = json!(7);

    let error = PipelineRun::from_json(&value.to_string()).unwrap_err();
    assert_eq!(error.code, ErrorCode::SerializationError);
    assert!(error.message.contains("age"));
}

#[tokio::test]
async fn test_independent_runs_share_one_runner() {
    let executor = ScriptedExecutor::new()
        .with_delay(Duration::from_millis(5))
        .into_arc();
    let runner = runner_with(linear_registry(3), Arc::clone(&executor));
    let (profile, metrics) = sample_inputs();
    let control = RunControl::new();

    let (first, second) = tokio::join!(
        runner.run_all(profile.clone(), metrics.clone(), &control),
        runner.run_all(profile, metrics, &control),
    );

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.run_id(), second.run_id());
    assert_eq!(first.stage_outputs().len(), 3);
    assert_eq!(second.stage_outputs().len(), 3);
    assert_eq!(executor.executed_ids().len(), 6);
}

#[tokio::test]
async fn test_builtin_catalog_dry_run_covers_active_stages() {
    init_test_logging();
    let registry = Arc::new(StageRegistry::builtin().unwrap());
    let runner = PipelineRunner::new(Arc::clone(&registry), Arc::new(DryRunExecutor::new()));
    let (profile, metrics) = sample_inputs();

    let run = runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap();

    let ids: Vec<&str> = run
        .stage_outputs()
        .iter()
        .map(|output| output.stage_id.as_str())
        .collect();
    assert_eq!(
        ids,
        [
            "analyze_fitness",
            "generate_workout",
            "create_meal_plan",
            "generate_grocery_list",
            "assess_skin",
            "design_routine",
            "format_plans",
            "create_visuals",
        ]
    );

    let first = &run.stage_outputs()[0].value;
    assert_eq!(first["agent"], "Personal Trainer");
    assert!(first["task"].as_str().unwrap().contains("Test User"));
    assert!(first["task"].as_str().unwrap().contains("1695.67"));
    let last = &run.stage_outputs()[7].value;
    assert_eq!(last["prior_stages"].as_array().unwrap().len(), 7);
}
