// ABOUTME: Repeated-run and replay commands for the vitacrew CLI
// ABOUTME: `train` stores N full runs, `replay` resumes a stored run, `test` times N runs against a model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use vitacrew::{
    errors::{AppError, AppResult},
    pipeline::PipelineRun,
};

use super::{finish_reporter, run_control, Context};
use crate::helpers::display::{print_run_summary, print_test_report, write_json, TestIteration};
use crate::helpers::input::{load_profile, ProfileInput};
use crate::RunArgs;

type Result<T> = AppResult<T>;

fn require_iterations(n_iterations: u32) -> Result<()> {
    if n_iterations == 0 {
        return Err(AppError::invalid_input(
            "Number of iterations must be at least 1",
        ));
    }
    Ok(())
}

/// Run the full pipeline `n_iterations` times and store every run in `filename`
pub async fn train(ctx: &Context, n_iterations: u32, filename: &Path, args: &RunArgs) -> Result<()> {
    require_iterations(n_iterations)?;
    let input = ProfileInput::from(args);
    let (profile, metrics) = load_profile(&input).await?;
    let executor = ctx.executor(args.dry_run, None)?;
    let (runner, reporter) = ctx.runner(executor);
    let control = run_control(args.timeout_secs);

    let mut runs: Vec<PipelineRun> = Vec::with_capacity(n_iterations as usize);
    for iteration in 1..=n_iterations {
        info!(iteration, n_iterations, "Training iteration");
        let result = runner
            .run_all(profile.clone(), metrics.clone(), &control)
            .await;
        match result {
            Ok(run) => runs.push(run),
            Err(e) => {
                finish_reporter(runner, reporter).await;
                if !runs.is_empty() {
                    write_json(&runs, Some(filename)).await?;
                    warn!(
                        completed_iterations = runs.len(),
                        "Training stopped early; completed runs were saved"
                    );
                }
                return Err(AppError::from(e));
            }
        }
    }
    finish_reporter(runner, reporter).await;

    write_json(&runs, Some(filename)).await?;
    info!(
        path = %filename.display(),
        runs = runs.len(),
        "Training runs saved"
    );
    Ok(())
}

/// Resume a stored run from `stage_id`
pub async fn replay(
    ctx: &Context,
    stage_id: &str,
    run_file: &Path,
    output: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let stored = PipelineRun::load(run_file).await?;
    info!(
        run_id = %stored.run_id(),
        stored_outputs = stored.stage_outputs().len(),
        "Loaded stored run"
    );

    let executor = ctx.executor(dry_run, None)?;
    let (runner, reporter) = ctx.runner(executor);
    let control = run_control(None);

    let result = runner.resume_from(stored, stage_id, &control).await;
    finish_reporter(runner, reporter).await;

    let run = result?;
    print_run_summary(&run);
    let destination = output.unwrap_or(run_file);
    run.save(destination).await?;
    info!(path = %destination.display(), "Replayed run saved");
    Ok(())
}

/// Run the full pipeline `n_iterations` times against `model` and report timings
pub async fn test(
    ctx: &Context,
    n_iterations: u32,
    model: &str,
    input: Option<&Path>,
) -> Result<()> {
    require_iterations(n_iterations)?;
    let input = ProfileInput {
        path: input.map(Path::to_path_buf),
        calories: None,
        goal: None,
    };
    let (profile, metrics) = load_profile(&input).await?;
    let executor = ctx.executor(false, Some(model))?;
    let (runner, reporter) = ctx.runner(executor);
    let control = run_control(None);

    let mut iterations = Vec::with_capacity(n_iterations as usize);
    let mut first_error: Option<AppError> = None;
    for iteration in 1..=n_iterations {
        let started = Instant::now();
        let result = runner
            .run_all(profile.clone(), metrics.clone(), &control)
            .await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (completed_stages, error) = match result {
            Ok(run) => (run.stage_outputs().len(), None),
            Err(e) => {
                let completed = e
                    .partial_run()
                    .map_or(0, |run| run.stage_outputs().len());
                (completed, Some(AppError::from(e)))
            }
        };
        iterations.push(TestIteration {
            iteration,
            completed_stages,
            elapsed_ms,
            error: error.as_ref().map(ToString::to_string),
        });
        if first_error.is_none() {
            first_error = error;
        }
    }
    finish_reporter(runner, reporter).await;

    print_test_report(model, &iterations);
    first_error.map_or(Ok(()), Err)
}
