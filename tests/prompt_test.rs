// ABOUTME: Integration tests for stage prompt rendering from profile, metrics and prior outputs
// ABOUTME: Captures the prompts a stage executor would send while a real pipeline run progresses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use async_trait::async_trait;
use common::{init_test_logging, sample_inputs, sample_raw};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use vitacrew::agents::prompt::{placeholder_values, render_template, system_prompt, task_prompt};
use vitacrew::errors::AppResult;
use vitacrew::pipeline::{PipelineRunner, RunControl, StageExecutor, StageInput};
use vitacrew::stages::{AgentDefinition, StageDefinition, StageRegistry};
use vitacrew::tools::AgentTool;
use vitacrew_core::validation::validate;
use vitacrew_intelligence::compute_health_metrics;

/// Records each task prompt and answers with a short structured output
#[derive(Default)]
struct PromptCapture {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl StageExecutor for PromptCapture {
    async fn execute(&self, input: StageInput<'_>) -> AppResult<Value> {
        self.prompts.lock().unwrap().push(task_prompt(&input));
        if input.stage.ordinal == 1 {
            Ok(json!("Squats three times a week."))
        } else {
            Ok(json!({"meals": 3}))
        }
    }
}

#[test]
fn test_placeholders_for_sample_profile() {
    let (profile, metrics) = sample_inputs();
    let values = placeholder_values(&profile, &metrics);

    assert_eq!(values["name"], "Test User");
    assert_eq!(values["gender"], "male");
    assert_eq!(values["height_cm"], "175");
    assert_eq!(values["waist_to_hip_ratio"], "0.89");
    assert_eq!(values["fitness_objectives"], "weight loss, muscle gain");
    assert_eq!(values["dietary_requirements"], "none");
    assert_eq!(values["activity_level"], "moderate");
    assert_eq!(values["bmr_kcal_per_day"], "1695.67");
    assert_eq!(values["calorie_target_kcal"], "2628");
    assert_eq!(values["goal"], "cutting");
    assert_eq!(values["protein_g"], "262.8");
}

#[test]
fn test_empty_lists_render_as_none() {
    let mut raw = sample_raw();
    raw.as_object_mut().unwrap().remove("skin_concerns");
    let profile = validate(&raw).unwrap();
    let metrics = compute_health_metrics(&profile, None, None).unwrap();

    let values = placeholder_values(&profile, &metrics);
    assert_eq!(values["skin_concerns"], "none");
}

#[test]
fn test_every_builtin_placeholder_is_known() {
    let (profile, metrics) = sample_inputs();
    let values = placeholder_values(&profile, &metrics);
    let registry = StageRegistry::builtin().unwrap();

    for stage in registry.all_stages() {
        for template in [&stage.description_template, &stage.expected_output] {
            let rendered = render_template(template, &values);
            assert!(
                !rendered.contains('{'),
                "unresolved placeholder in {}: {rendered}",
                stage.stage_id
            );
        }
    }
}

#[test]
fn test_system_prompt_lists_tools() {
    let agent = AgentDefinition::new("coach", "Coach", " Win ", "Former athlete")
        .with_tools(&[AgentTool::MacroCalculator]);
    let prompt = system_prompt(&agent);

    assert!(prompt.starts_with("You are Coach,"));
    assert!(prompt.contains("## Your goal\nWin\n"));
    assert!(prompt.contains("- `macro_calculator`: "));

    let plain = system_prompt(&AgentDefinition::new("coach", "Coach", "Win", "Athlete"));
    assert!(plain.contains("No tools are available"));
}

#[tokio::test]
async fn test_task_prompt_includes_earlier_work() {
    init_test_logging();
    let agents = vec![AgentDefinition::new("coach", "Coach", "goal", "story")];
    let stages = vec![
        StageDefinition::new("workout", 1, "coach", "Workout for {name} at {weight_kg} kg")
            .with_expected_output("A weekly schedule"),
        StageDefinition::new("meals", 2, "coach", "Meals totalling {calorie_target_kcal} kcal"),
        StageDefinition::new("summary", 3, "coach", "Summarise for {nickname}"),
    ];
    let registry = Arc::new(StageRegistry::new(agents, stages).unwrap());
    let capture = Arc::new(PromptCapture::default());
    let runner = PipelineRunner::new(registry, Arc::clone(&capture) as Arc<dyn StageExecutor>);
    let (profile, metrics) = sample_inputs();

    runner
        .run_all(profile, metrics, &RunControl::new())
        .await
        .unwrap();

    let prompts = capture.prompts.lock().unwrap().clone();
    assert_eq!(
        prompts[0],
        "Workout for Test User at 70 kg\n\n## Expected output\nA weekly schedule"
    );

    assert!(prompts[1].starts_with("Meals totalling 2628 kcal"));
    assert!(prompts[1].contains("## Work completed by the team so far"));
    assert!(prompts[1].contains("### workout (coach)\nSquats three times a week.\n"));

    assert!(prompts[2].starts_with("Summarise for {nickname}"));
    assert!(prompts[2].contains("### meals (coach)\n{\n  \"meals\": 3\n}\n"));
}
