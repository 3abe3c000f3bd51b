// ABOUTME: VitaCrew CLI - runs the wellness plan pipeline from the command line
// ABOUTME: Full runs, single stages, catalog listing, metrics, and train/replay/test drivers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors
//!
//! Usage:
//! ```bash
//! # Run every active stage for the built-in sample profile
//! vitacrew run
//!
//! # Run for a profile file, saving the run for later replay
//! vitacrew run --input profile.json --output run.json
//!
//! # Render prompts only, no model calls
//! vitacrew run --dry-run
//!
//! # Run a single stage
//! vitacrew run-stage assess_skin --input profile.json
//!
//! # List the stage catalog, inactive stages included
//! vitacrew stages --all
//!
//! # Show computed health metrics
//! vitacrew metrics --input profile.json --goal cutting
//!
//! # Run the pipeline 3 times and store every run
//! vitacrew train 3 runs.json
//!
//! # Re-execute a stored run from one stage onward
//! vitacrew replay create_meal_plan --run run.json
//!
//! # Run the pipeline 2 times against a specific model and report timings
//! vitacrew test 2 llama3.1:8b
//! ```

mod commands;
mod helpers;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use vitacrew::{
    config::VitacrewConfig,
    errors::{AppResult, ErrorResponse},
    logging::LoggingConfig,
    stages::StageRegistry,
};

use commands::Context;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "vitacrew",
    version,
    about = "VitaCrew wellness plan pipeline",
    long_about = "Validates a biometric and lifestyle profile, computes health metrics and runs the ordered stage pipeline that turns them into a wellness plan."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Stage catalog file overriding VITACREW_STAGE_CATALOG and the embedded catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

/// Options shared by commands that execute stages
#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Profile JSON file (defaults to the built-in sample profile)
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Write the result to this file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Render prompts without calling a model
    #[arg(long)]
    dry_run: bool,

    /// Daily calorie target (defaults to BMR times the activity factor)
    #[arg(long)]
    calories: Option<f64>,

    /// Macro goal: maintenance, bulking or cutting (defaults to the objectives)
    #[arg(long)]
    goal: Option<String>,

    /// Stop the run after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Run every active stage
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Run one stage without its predecessors
    RunStage {
        /// Stage id
        stage_id: String,

        #[command(flatten)]
        args: RunArgs,
    },

    /// List the stage catalog
    Stages {
        /// Include inactive stages
        #[arg(long)]
        all: bool,
    },

    /// Validate a profile and print its health metrics
    Metrics {
        /// Profile JSON file (defaults to the built-in sample profile)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Daily calorie target
        #[arg(long)]
        calories: Option<f64>,

        /// Macro goal
        #[arg(long)]
        goal: Option<String>,
    },

    /// Run the full pipeline repeatedly and store every run
    Train {
        /// Number of iterations
        n_iterations: u32,

        /// File receiving the runs as a JSON array
        filename: PathBuf,

        #[command(flatten)]
        args: RunArgs,
    },

    /// Re-execute a stored run from a stage onward
    Replay {
        /// Stage to resume from
        stage_id: String,

        /// Stored run file
        #[arg(long)]
        run: PathBuf,

        /// Write the replayed run here instead of overwriting the run file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Render prompts without calling a model
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the full pipeline repeatedly against a model and report timings
    Test {
        /// Number of iterations
        n_iterations: u32,

        /// Model name sent to the endpoint
        model: String,

        /// Profile JSON file (defaults to the built-in sample profile)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = LoggingConfig::from_env().verbose(cli.verbose).init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = ?e.code, "{e}");
            let response = ErrorResponse::from(&e);
            if let Ok(json) = serde_json::to_string_pretty(&response) {
                eprintln!("{json}");
            }
            ExitCode::from(e.code.exit_code())
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let mut config = VitacrewConfig::from_env()?;
    if cli.catalog.is_some() {
        config.pipeline.stage_catalog = cli.catalog;
    }

    let registry = Arc::new(StageRegistry::load(&config.pipeline)?);
    info!(
        environment = %config.environment,
        stages = registry.all_stages().len(),
        "VitaCrew CLI ready"
    );
    if config.environment.is_production() && config.llm.api_key.is_none() {
        warn!("No LLM API key configured for a production environment");
    }

    let ctx = Context { config, registry };

    match cli.command {
        Command::Run { args } => commands::run::run_all(&ctx, &args).await,
        Command::RunStage { stage_id, args } => {
            commands::run::run_stage(&ctx, &stage_id, &args).await
        }
        Command::Stages { all } => {
            commands::catalog::stages(&ctx, all);
            Ok(())
        }
        Command::Metrics {
            input,
            calories,
            goal,
        } => commands::catalog::metrics(input.as_deref(), calories, goal.as_deref()).await,
        Command::Train {
            n_iterations,
            filename,
            args,
        } => commands::training::train(&ctx, n_iterations, &filename, &args).await,
        Command::Replay {
            stage_id,
            run,
            output,
            dry_run,
        } => {
            commands::training::replay(&ctx, &stage_id, &run, output.as_deref(), dry_run).await
        }
        Command::Test {
            n_iterations,
            model,
            input,
        } => commands::training::test(&ctx, n_iterations, &model, input.as_deref()).await,
    }
}
