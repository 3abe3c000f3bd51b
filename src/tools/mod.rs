// ABOUTME: Calculator tools agents may call while executing a stage
// ABOUTME: BMR and macro calculators, progress tracker and report generator with JSON schemas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Agent Tools
//!
//! A fixed, statically known tool set. The catalog names the tools each
//! agent may use; [`crate::agents::LlmStageExecutor`] offers those as
//! function declarations and runs [`AgentTool::invoke`] locally when the
//! model asks for one.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use vitacrew_core::errors::ToolError;
use vitacrew_core::models::Gender;
use vitacrew_intelligence::MetricsEngine;

use crate::llm::{FunctionDeclaration, Tool};

/// Oldest age accepted by the BMR calculator
const MAX_TOOL_AGE: u64 = 150;

/// Tools an agent can be granted in the stage catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTool {
    /// Harris-Benedict basal metabolic rate
    BmrCalculator,
    /// Macronutrient grams for a calorie target and goal
    MacroCalculator,
    /// Records a progress measurement
    ProgressTracker,
    /// Produces a report for collected data
    ReportGenerator,
}

impl AgentTool {
    /// Every tool, in declaration order
    pub const ALL: &'static [Self] = &[
        Self::BmrCalculator,
        Self::MacroCalculator,
        Self::ProgressTracker,
        Self::ReportGenerator,
    ];

    /// Function name offered to the model
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BmrCalculator => "bmr_calculator",
            Self::MacroCalculator => "macro_calculator",
            Self::ProgressTracker => "progress_tracker",
            Self::ReportGenerator => "report_generator",
        }
    }

    /// Description offered to the model
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::BmrCalculator => {
                "Calculates Basal Metabolic Rate based on weight, height, age, and gender"
            }
            Self::MacroCalculator => {
                "Calculates daily macronutrient grams based on calorie target and nutrition goal"
            }
            Self::ProgressTracker => "Tracks progress for various health and fitness metrics",
            Self::ReportGenerator => {
                "Generates formatted reports for various health and fitness metrics"
            }
        }
    }

    /// JSON schema of the arguments
    #[must_use]
    pub fn parameters(&self) -> Value {
        match self {
            Self::BmrCalculator => json!({
                "type": "object",
                "properties": {
                    "weight": { "type": "number", "description": "Weight in kg" },
                    "height": { "type": "number", "description": "Height in cm" },
                    "age": { "type": "integer", "description": "Age in years" },
                    "gender": {
                        "type": "string",
                        "description": "Gender",
                        "enum": ["male", "female", "other"]
                    }
                },
                "required": ["weight", "height", "age", "gender"]
            }),
            Self::MacroCalculator => json!({
                "type": "object",
                "properties": {
                    "calories": { "type": "number", "description": "Daily calorie target" },
                    "goal": {
                        "type": "string",
                        "description": "Nutrition goal",
                        "enum": ["maintenance", "bulking", "cutting"]
                    }
                },
                "required": ["calories", "goal"]
            }),
            Self::ProgressTracker => json!({
                "type": "object",
                "properties": {
                    "metric_type": {
                        "type": "string",
                        "description": "Type of metric to track (workout/nutrition/skin)"
                    },
                    "value": { "type": "number", "description": "Current metric value" },
                    "date": {
                        "type": "string",
                        "description": "Date of measurement (YYYY-MM-DD), defaults to today"
                    },
                    "notes": { "type": "string", "description": "Additional notes" }
                },
                "required": ["metric_type", "value"]
            }),
            Self::ReportGenerator => json!({
                "type": "object",
                "properties": {
                    "report_type": { "type": "string", "description": "Type of report to generate" },
                    "data": { "type": "object", "description": "Data to include in the report" },
                    "format": {
                        "type": "string",
                        "description": "Output format",
                        "enum": ["pdf", "html"]
                    }
                },
                "required": ["report_type", "data", "format"]
            }),
        }
    }

    /// Function declaration for the LLM provider
    #[must_use]
    pub fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name().to_owned(),
            description: self.description().to_owned(),
            parameters: Some(self.parameters()),
        }
    }

    /// Group a tool list into a single provider `Tool`
    #[must_use]
    pub fn tool_set(tools: &[Self]) -> Tool {
        Tool {
            function_declarations: tools.iter().map(Self::declaration).collect(),
        }
    }

    /// Run the tool locally
    ///
    /// # Errors
    ///
    /// Returns `ToolError::MissingParameter` or `ToolError::InvalidParameter`
    /// when the arguments do not match [`AgentTool::parameters`].
    pub fn invoke(&self, args: &Value, engine: &MetricsEngine<'_>) -> Result<Value, ToolError> {
        let args = Args {
            tool: self.name(),
            values: args,
        };
        match self {
            Self::BmrCalculator => {
                let weight = args.number("weight")?;
                let height = args.number("height")?;
                let age = args.age("age")?;
                let gender = args.string("gender")?;
                let gender = Gender::from_str(gender)
                    .map_err(|e| ToolError::invalid_parameter(self.name(), "gender", e.to_string()))?;
                let bmr = engine.compute_bmr(weight, height, age, gender);
                Ok(json!({ "bmr_kcal_per_day": bmr }))
            }
            Self::MacroCalculator => {
                let calories = args.number("calories")?;
                if calories <= 0.0 {
                    return Err(ToolError::invalid_parameter(
                        self.name(),
                        "calories",
                        "must be positive",
                    ));
                }
                let goal = args.string("goal")?;
                let macros = engine.compute_macros(calories, goal);
                Ok(json!({
                    "protein": macros.protein_g,
                    "carbs": macros.carbs_g,
                    "fats": macros.fats_g,
                }))
            }
            Self::ProgressTracker => {
                let metric_type = args.string("metric_type")?;
                let value = args.number("value")?;
                let date = args.optional_string("date")?.map_or_else(
                    || Utc::now().format("%Y-%m-%d").to_string(),
                    ToOwned::to_owned,
                );
                let notes = args.optional_string("notes")?;
                Ok(json!({
                    "metric_type": metric_type,
                    "value": value,
                    "date": date,
                    "notes": notes,
                    "status": "recorded",
                }))
            }
            Self::ReportGenerator => {
                let report_type = args.string("report_type")?;
                let format = args.string("format")?;
                if !args.values.get("data").is_some_and(Value::is_object) {
                    return Err(ToolError::missing_parameter(self.name(), "data"));
                }
                Ok(Value::String(format!(
                    "Generated {format} report for {report_type} with provided data"
                )))
            }
        }
    }
}

impl fmt::Display for AgentTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AgentTool {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| ToolError::not_found(s))
    }
}

/// Typed access to a tool's JSON arguments
struct Args<'a> {
    tool: &'static str,
    values: &'a Value,
}

impl<'a> Args<'a> {
    fn get(&self, name: &str) -> Option<&'a Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    fn number(&self, name: &str) -> Result<f64, ToolError> {
        let value = self
            .get(name)
            .ok_or_else(|| ToolError::missing_parameter(self.tool, name))?;
        value
            .as_f64()
            .filter(|number| number.is_finite())
            .ok_or_else(|| ToolError::invalid_parameter(self.tool, name, "must be a number"))
    }

    fn age(&self, name: &str) -> Result<u32, ToolError> {
        let value = self
            .get(name)
            .ok_or_else(|| ToolError::missing_parameter(self.tool, name))?;
        value
            .as_u64()
            .filter(|age| *age <= MAX_TOOL_AGE)
            .map(|age| age as u32)
            .ok_or_else(|| {
                ToolError::invalid_parameter(
                    self.tool,
                    name,
                    format!("must be a whole number between 0 and {MAX_TOOL_AGE}"),
                )
            })
    }

    fn string(&self, name: &str) -> Result<&'a str, ToolError> {
        self.optional_string(name)?
            .ok_or_else(|| ToolError::missing_parameter(self.tool, name))
    }

    fn optional_string(&self, name: &str) -> Result<Option<&'a str>, ToolError> {
        self.get(name).map_or(Ok(None), |value| {
            value
                .as_str()
                .map(Some)
                .ok_or_else(|| ToolError::invalid_parameter(self.tool, name, "must be a string"))
        })
    }
}
