// ABOUTME: Integration tests for the calculator tools agents call during stage execution
// ABOUTME: Checks results, argument errors and the declarations offered to the model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serde_json::json;
use vitacrew::errors::{AppError, ErrorCode, ToolError};
use vitacrew::tools::AgentTool;
use vitacrew_intelligence::MetricsEngine;

#[test]
fn test_bmr_calculator_matches_engine() {
    let args = json!({"weight": 70, "height": 175, "age": 30, "gender": "Male"});
    let result = AgentTool::BmrCalculator
        .invoke(&args, &MetricsEngine::global())
        .unwrap();
    assert_eq!(result, json!({"bmr_kcal_per_day": 1695.67}));
}

#[test]
fn test_bmr_calculator_rejects_unknown_gender() {
    let args = json!({"weight": 70, "height": 175, "age": 30, "gender": "robot"});
    let error = AgentTool::BmrCalculator
        .invoke(&args, &MetricsEngine::global())
        .unwrap_err();
    assert!(matches!(
        error,
        ToolError::InvalidParameter { ref parameter, .. } if parameter == "gender"
    ));
}

#[test]
fn test_macro_calculator() {
    let args = json!({"calories": 2000, "goal": "cutting"});
    let result = AgentTool::MacroCalculator
        .invoke(&args, &MetricsEngine::global())
        .unwrap();
    assert_eq!(result, json!({"protein": 200.0, "carbs": 150.0, "fats": 66.7}));
}

#[test]
fn test_macro_calculator_requires_positive_calories() {
    let args = json!({"calories": 0, "goal": "bulking"});
    let error = AgentTool::MacroCalculator
        .invoke(&args, &MetricsEngine::global())
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Invalid parameter 'calories' for tool 'macro_calculator': must be positive"
    );
}

#[test]
fn test_progress_tracker_records_measurement() {
    let args = json!({
        "metric_type": "workout",
        "value": 42.5,
        "date": "2025-03-01",
        "notes": "felt strong"
    });
    let result = AgentTool::ProgressTracker
        .invoke(&args, &MetricsEngine::global())
        .unwrap();
    assert_eq!(
        result,
        json!({
            "metric_type": "workout",
            "value": 42.5,
            "date": "2025-03-01",
            "notes": "felt strong",
            "status": "recorded"
        })
    );
}

#[test]
fn test_progress_tracker_defaults_date_to_today() {
    let args = json!({"metric_type": "skin", "value": 3});
    let result = AgentTool::ProgressTracker
        .invoke(&args, &MetricsEngine::global())
        .unwrap();
    let date = result["date"].as_str().unwrap();
    assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
    assert!(result["notes"].is_null());
}

#[test]
fn test_report_generator() {
    let args = json!({"report_type": "weekly", "data": {"workouts": 4}, "format": "html"});
    let result = AgentTool::ReportGenerator
        .invoke(&args, &MetricsEngine::global())
        .unwrap();
    assert_eq!(
        result,
        json!("Generated html report for weekly with provided data")
    );
}

#[test]
fn test_report_generator_requires_data_object() {
    let args = json!({"report_type": "weekly", "data": "none", "format": "pdf"});
    let error = AgentTool::ReportGenerator
        .invoke(&args, &MetricsEngine::global())
        .unwrap_err();
    assert_eq!(error, ToolError::missing_parameter("report_generator", "data"));
}

#[test]
fn test_missing_parameters_are_named() {
    let engine = MetricsEngine::global();
    for (tool, missing) in [
        (AgentTool::BmrCalculator, "weight"),
        (AgentTool::MacroCalculator, "calories"),
        (AgentTool::ProgressTracker, "metric_type"),
        (AgentTool::ReportGenerator, "report_type"),
    ] {
        let error = tool.invoke(&json!({}), &engine).unwrap_err();
        assert_eq!(error, ToolError::missing_parameter(tool.name(), missing));
    }
}

#[test]
fn test_wrong_argument_types_are_invalid() {
    let args = json!({"calories": "lots", "goal": "cutting"});
    let error = AgentTool::MacroCalculator
        .invoke(&args, &MetricsEngine::global())
        .unwrap_err();
    let app: AppError = error.into();
    assert_eq!(app.code, ErrorCode::InvalidInput);
}

#[test]
fn test_unknown_tool_name() {
    let error = "horoscope".parse::<AgentTool>().unwrap_err();
    assert_eq!(error, ToolError::not_found("horoscope"));
    assert_eq!(AppError::from(error).code, ErrorCode::ResourceNotFound);
}

#[test]
fn test_tool_set_declarations() {
    let tool = AgentTool::tool_set(&[AgentTool::BmrCalculator, AgentTool::ReportGenerator]);
    let names: Vec<&str> = tool
        .function_declarations
        .iter()
        .map(|declaration| declaration.name.as_str())
        .collect();
    assert_eq!(names, ["bmr_calculator", "report_generator"]);

    let report = &tool.function_declarations[1];
    let schema = report.parameters.as_ref().unwrap();
    assert_eq!(schema["required"], json!(["report_type", "data", "format"]));
}
