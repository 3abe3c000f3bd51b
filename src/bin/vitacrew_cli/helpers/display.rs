// ABOUTME: Output formatting helpers for the vitacrew CLI
// ABOUTME: Stage tables, run summaries, test reports, JSON output and the progress reporter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use serde::Serialize;
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::info;
use vitacrew::{
    errors::AppResult,
    pipeline::{EventReceiver, PipelineRun, StageEvent},
    stages::StageRegistry,
};

/// Outcome of one `test` iteration
pub struct TestIteration {
    pub iteration: u32,
    pub completed_stages: usize,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

/// Print progress events on stderr until the sender is dropped
pub fn spawn_progress_reporter(mut receiver: EventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match event {
                StageEvent::Started {
                    stage_id,
                    ordinal,
                    role,
                } => eprintln!("[{ordinal:>2}] {stage_id} -> {role} ..."),
                StageEvent::Completed {
                    stage_id,
                    duration_ms,
                } => eprintln!("     {stage_id} done in {duration_ms} ms"),
                StageEvent::Failed { stage_id, error } => {
                    eprintln!("     {stage_id} FAILED: {error}");
                }
            }
        }
    })
}

/// Print the catalog as a table
pub fn print_stage_table(registry: &StageRegistry, include_inactive: bool) {
    println!("{:<4} {:<24} {:<20} {:<8}", "ORD", "STAGE", "ROLE", "STATUS");
    println!("{}", "=".repeat(60));
    for stage in registry
        .all_stages()
        .iter()
        .filter(|stage| include_inactive || stage.is_active())
    {
        println!(
            "{:<4} {:<24} {:<20} {:<8}",
            stage.ordinal,
            stage.stage_id,
            stage.delegated_role,
            stage.status.to_string()
        );
    }
}

/// Print one line per completed stage on stderr
pub fn print_run_summary(run: &PipelineRun) {
    eprintln!("\nRun {}", run.run_id());
    eprintln!("{}", "=".repeat(60));
    for output in run.stage_outputs() {
        eprintln!(
            "  {:<24} {:<20} {:>8} ms",
            output.stage_id, output.delegated_role, output.duration_ms
        );
    }
    let total_ms: u64 = run.stage_outputs().iter().map(|o| o.duration_ms).sum();
    eprintln!(
        "  {} stage(s), {total_ms} ms total",
        run.stage_outputs().len()
    );
}

/// Print the `test` timing table
pub fn print_test_report(model: &str, iterations: &[TestIteration]) {
    println!("\nModel: {model}");
    println!("{}", "=".repeat(60));
    println!("{:<6} {:<8} {:>10}  {}", "ITER", "STAGES", "MS", "RESULT");
    for entry in iterations {
        println!(
            "{:<6} {:<8} {:>10}  {}",
            entry.iteration,
            entry.completed_stages,
            entry.elapsed_ms,
            entry.error.as_deref().unwrap_or("ok")
        );
    }
    let passed = iterations.iter().filter(|e| e.error.is_none()).count();
    println!("\n{passed}/{} iteration(s) completed", iterations.len());
}

/// Pretty JSON to `path`, or stdout when no path is given
pub async fn write_json<T: Serialize + Sync>(value: &T, path: Option<&Path>) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            info!(path = %path.display(), "Output written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
