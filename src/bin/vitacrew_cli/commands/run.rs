// ABOUTME: Pipeline execution commands for the vitacrew CLI
// ABOUTME: Handles `run` (every active stage) and `run-stage` (one stage in isolation)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use tracing::info;
use vitacrew::errors::AppResult;

use super::{finish_reporter, run_control, Context};
use crate::helpers::display::{print_run_summary, write_json};
use crate::helpers::input::{load_profile, ProfileInput};
use crate::RunArgs;

type Result<T> = AppResult<T>;

/// Execute every active stage
pub async fn run_all(ctx: &Context, args: &RunArgs) -> Result<()> {
    let input = ProfileInput::from(args);
    let (profile, metrics) = load_profile(&input).await?;
    let executor = ctx.executor(args.dry_run, None)?;
    let (runner, reporter) = ctx.runner(executor);
    let control = run_control(args.timeout_secs);

    let result = runner.run_all(profile, metrics, &control).await;
    finish_reporter(runner, reporter).await;

    match result {
        Ok(run) => {
            print_run_summary(&run);
            write_json(&run, args.output.as_deref()).await
        }
        Err(e) => {
            if let (Some(path), Some(partial)) = (args.output.as_deref(), e.partial_run()) {
                partial.save(path).await?;
                info!(
                    path = %path.display(),
                    completed_stages = partial.stage_outputs().len(),
                    "Saved partial run; resume it with `vitacrew replay`"
                );
            }
            Err(e.into())
        }
    }
}

/// Execute one stage without its predecessors
pub async fn run_stage(ctx: &Context, stage_id: &str, args: &RunArgs) -> Result<()> {
    let input = ProfileInput::from(args);
    let (profile, metrics) = load_profile(&input).await?;
    let executor = ctx.executor(args.dry_run, None)?;
    let (runner, reporter) = ctx.runner(executor);
    let control = run_control(args.timeout_secs);

    let result = runner.run_one(stage_id, &profile, &metrics, &control).await;
    finish_reporter(runner, reporter).await;

    let output = result?;
    write_json(&output, args.output.as_deref()).await
}
