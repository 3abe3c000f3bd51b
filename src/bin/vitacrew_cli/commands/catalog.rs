// ABOUTME: Read-only commands for the vitacrew CLI
// ABOUTME: Lists the stage catalog and prints the health metrics computed for a profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use std::path::Path;
use vitacrew::errors::AppResult;

use super::Context;
use crate::helpers::display::{print_stage_table, write_json};
use crate::helpers::input::{load_profile, ProfileInput};

/// Print the catalog
pub fn stages(ctx: &Context, include_inactive: bool) {
    print_stage_table(&ctx.registry, include_inactive);
}

/// Validate a profile and print its metrics as JSON
pub async fn metrics(input: Option<&Path>, calories: Option<f64>, goal: Option<&str>) -> AppResult<()> {
    let input = ProfileInput {
        path: input.map(Path::to_path_buf),
        calories,
        goal: goal.map(str::to_owned),
    };
    let (_, metrics) = load_profile(&input).await?;
    write_json(&metrics, None).await
}
