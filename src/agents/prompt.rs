// ABOUTME: Prompt rendering for stage execution: placeholder substitution and prompt assembly
// ABOUTME: Stage templates stay opaque to the pipeline; only executors render them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use vitacrew_core::models::{HealthMetrics, UserProfile};

use crate::pipeline::{StageInput, StageOutput};
use crate::stages::AgentDefinition;

/// System prompt template loaded at compile time
pub const AGENT_SYSTEM_PROMPT: &str = include_str!("agent_system.md");

/// Placeholder values available to stage templates
pub type Placeholders = BTreeMap<&'static str, String>;

fn join_or_none<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        "none".to_owned()
    } else {
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Values for every profile and metrics placeholder
#[must_use]
pub fn placeholder_values(profile: &UserProfile, metrics: &HealthMetrics) -> Placeholders {
    let macros = metrics.macro_targets();
    let mut values = Placeholders::new();
    values.insert("name", profile.name().to_owned());
    values.insert("age", profile.age().to_string());
    values.insert("gender", profile.gender().to_string());
    values.insert("height_cm", profile.height_cm().to_string());
    values.insert("weight_kg", profile.weight_kg().to_string());
    values.insert("waist_cm", profile.waist_cm().to_string());
    values.insert("hip_cm", profile.hip_cm().to_string());
    values.insert(
        "waist_to_hip_ratio",
        format!("{:.2}", profile.waist_to_hip_ratio()),
    );
    values.insert(
        "fitness_objectives",
        join_or_none(profile.fitness_objectives()),
    );
    values.insert(
        "dietary_requirements",
        join_or_none(profile.dietary_requirements()),
    );
    values.insert("skin_type", profile.skin_type().to_string());
    values.insert("skin_concerns", join_or_none(profile.skin_concerns()));
    values.insert("sleep_hours", profile.sleep_hours().to_string());
    values.insert("stress_level", profile.stress_level().to_string());
    values.insert("activity_level", profile.activity_level().to_string());
    values.insert("bmr_kcal_per_day", metrics.bmr_kcal_per_day().to_string());
    values.insert(
        "calorie_target_kcal",
        metrics.calorie_target_kcal().to_string(),
    );
    values.insert("goal", metrics.goal().to_string());
    values.insert("protein_g", macros.protein_g.to_string());
    values.insert("carbs_g", macros.carbs_g.to_string());
    values.insert("fats_g", macros.fats_g.to_string());
    values
}

/// Substitute `{placeholder}` occurrences
///
/// Unknown placeholders and unbalanced braces are left in the output as written.
#[must_use]
pub fn render_template(template: &str, values: &Placeholders) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rest = &rest[open..];
            break;
        };
        let key = &after[..close];
        if key.contains('{') {
            rendered.push('{');
            rest = after;
            continue;
        }
        match values.get(key) {
            Some(value) => rendered.push_str(value),
            None => {
                rendered.push('{');
                rendered.push_str(key);
                rendered.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    rendered.push_str(rest);
    rendered
}

/// System prompt describing the agent a stage is delegated to
#[must_use]
pub fn system_prompt(agent: &AgentDefinition) -> String {
    let tools = if agent.tools.is_empty() {
        "No tools are available; answer from the data provided.".to_owned()
    } else {
        agent
            .tools
            .iter()
            .map(|tool| format!("- `{}`: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut values = Placeholders::new();
    values.insert("display_name", agent.display_name.clone());
    values.insert("goal", agent.goal.trim().to_owned());
    values.insert("backstory", agent.backstory.trim().to_owned());
    values.insert("tools", tools);
    render_template(AGENT_SYSTEM_PROMPT, &values)
}

/// Text form of a stage output for inclusion in later prompts
#[must_use]
pub fn output_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn push_prior_outputs(prompt: &mut String, prior_outputs: &[StageOutput]) {
    if prior_outputs.is_empty() {
        return;
    }
    prompt.push_str("\n\n## Work completed by the team so far\n");
    for output in prior_outputs {
        // Writing to a String cannot fail
        let _ = write!(
            prompt,
            "\n### {} ({})\n{}\n",
            output.stage_id,
            output.delegated_role,
            output_text(&output.value).trim()
        );
    }
}

/// Task prompt for one stage: rendered description, expected output and prior work
#[must_use]
pub fn task_prompt(input: &StageInput<'_>) -> String {
    let values = placeholder_values(input.profile, input.metrics);
    let mut prompt = render_template(&input.stage.description_template, &values);

    if !input.stage.expected_output.is_empty() {
        prompt.push_str("\n\n## Expected output\n");
        prompt.push_str(&render_template(&input.stage.expected_output, &values));
    }

    push_prior_outputs(&mut prompt, input.prior_outputs);
    prompt
}
