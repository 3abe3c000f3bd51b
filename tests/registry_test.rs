// ABOUTME: Integration tests for loading and querying the stage catalog
// ABOUTME: Embedded catalog order, YAML validation failures, file loading and stage lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::io::Write;
use std::path::PathBuf;
use vitacrew::config::PipelineSettings;
use vitacrew::errors::{AppError, ErrorCode};
use vitacrew::pipeline::PipelineError;
use vitacrew::stages::{
    AgentDefinition, CatalogError, StageDefinition, StageRegistry, StageStatus,
};
use vitacrew::tools::AgentTool;

const AGENTS_YAML: &str = r"
agents:
  - role: chef
    display_name: Chef
    goal: Cook well
    backstory: Trained in Lyon
    tools: [macro_calculator]
  - role: critic
    display_name: Critic
    goal: Judge fairly
    backstory: Eats out a lot
";

fn catalog(stages: &str) -> String {
    format!("{AGENTS_YAML}stages:\n{stages}")
}

#[test]
fn test_builtin_catalog_order_and_delegation() {
    let registry = StageRegistry::builtin().unwrap();

    let all: Vec<(u32, &str, &str)> = registry
        .all_stages()
        .iter()
        .map(|stage| {
            (
                stage.ordinal,
                stage.stage_id.as_str(),
                stage.delegated_role.as_str(),
            )
        })
        .collect();
    assert_eq!(
        all,
        [
            (1, "analyze_fitness", "personal_trainer"),
            (2, "generate_workout", "personal_trainer"),
            (3, "create_meal_plan", "nutritionist"),
            (4, "generate_grocery_list", "nutritionist"),
            (5, "assess_skin", "beauty_specialist"),
            (6, "design_routine", "beauty_specialist"),
            (7, "analyze_data", "health_analyst"),
            (8, "generate_report", "health_analyst"),
            (9, "format_plans", "design_specialist"),
            (10, "create_visuals", "design_specialist"),
        ]
    );

    let inactive: Vec<&str> = registry
        .all_stages()
        .iter()
        .filter(|stage| stage.status == StageStatus::Inactive)
        .map(|stage| stage.stage_id.as_str())
        .collect();
    assert_eq!(inactive, ["analyze_data", "generate_report"]);
}

#[test]
fn test_builtin_agent_tools() {
    let registry = StageRegistry::builtin().unwrap();

    let trainer = registry.agent("personal_trainer").unwrap();
    assert_eq!(trainer.display_name, "Personal Trainer");
    assert!(trainer.can_use(AgentTool::BmrCalculator));
    assert!(!trainer.can_use(AgentTool::ReportGenerator));

    let designer = registry.agent("design_specialist").unwrap();
    assert_eq!(designer.tools, [AgentTool::ReportGenerator]);
    assert!(registry.agent("barista").is_none());
}

#[test]
fn test_every_builtin_stage_has_expected_output() {
    let registry = StageRegistry::builtin().unwrap();
    for stage in registry.all_stages() {
        assert!(
            !stage.expected_output.is_empty(),
            "{} has no expected output",
            stage.stage_id
        );
        assert!(
            !stage.description_template.ends_with('\n'),
            "{} description not trimmed",
            stage.stage_id
        );
    }
}

#[test]
fn test_stages_sorted_by_ordinal_regardless_of_file_order() {
    let yaml = catalog(
        "  - {id: dessert, ordinal: 30, role: chef, description: Bake}\n\
         \x20 - {id: starter, ordinal: 10, role: chef, description: Slice}\n\
         \x20 - {id: review, ordinal: 20, role: critic, description: Taste, active: false}\n",
    );
    let registry = StageRegistry::from_yaml_str(&yaml).unwrap();

    let ids: Vec<&str> = registry
        .all_stages()
        .iter()
        .map(|stage| stage.stage_id.as_str())
        .collect();
    assert_eq!(ids, ["starter", "review", "dessert"]);
    let active: Vec<&str> = registry
        .active_stages()
        .map(|stage| stage.stage_id.as_str())
        .collect();
    assert_eq!(active, ["starter", "dessert"]);
}

#[test]
fn test_duplicate_stage_id_rejected() {
    let yaml = catalog(
        "  - {id: cook, ordinal: 1, role: chef, description: One}\n\
         \x20 - {id: cook, ordinal: 2, role: chef, description: Two}\n",
    );
    assert!(matches!(
        StageRegistry::from_yaml_str(&yaml),
        Err(CatalogError::DuplicateStageId(ref id)) if id == "cook"
    ));
}

#[test]
fn test_duplicate_ordinal_rejected() {
    let yaml = catalog(
        "  - {id: cook, ordinal: 4, role: chef, description: One}\n\
         \x20 - {id: judge, ordinal: 4, role: critic, description: Two}\n",
    );
    match StageRegistry::from_yaml_str(&yaml) {
        Err(CatalogError::DuplicateOrdinal { ordinal, .. }) => assert_eq!(ordinal, 4),
        other => panic!("expected DuplicateOrdinal, got {other:?}"),
    }
}

#[test]
fn test_unknown_role_rejected() {
    let yaml = catalog("  - {id: pour, ordinal: 1, role: sommelier, description: Pour}\n");
    match StageRegistry::from_yaml_str(&yaml) {
        Err(CatalogError::UnknownRole { stage_id, role }) => {
            assert_eq!(stage_id, "pour");
            assert_eq!(role, "sommelier");
        }
        other => panic!("expected UnknownRole, got {other:?}"),
    }
}

#[test]
fn test_duplicate_role_rejected() {
    let agents = vec![
        AgentDefinition::new("chef", "Chef", "a", "b"),
        AgentDefinition::new("chef", "Other Chef", "c", "d"),
    ];
    let stages = vec![StageDefinition::new("cook", 1, "chef", "Cook")];
    assert!(matches!(
        StageRegistry::new(agents, stages),
        Err(CatalogError::DuplicateRole(_))
    ));
}

#[test]
fn test_empty_catalog_rejected() {
    let agents = vec![AgentDefinition::new("chef", "Chef", "a", "b")];
    let error = StageRegistry::new(agents, Vec::new()).unwrap_err();
    assert!(matches!(error, CatalogError::Empty));
    assert_eq!(AppError::from(error).code, ErrorCode::ConfigInvalid);
}

#[test]
fn test_catalog_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let yaml = catalog("  - {id: cook, ordinal: 1, role: chef, description: 'Cook for {name}'}\n");
    file.write_all(yaml.as_bytes()).unwrap();

    let settings = PipelineSettings {
        stage_catalog: Some(file.path().to_path_buf()),
        ..PipelineSettings::default()
    };
    let registry = StageRegistry::load(&settings).unwrap();

    assert_eq!(registry.all_stages().len(), 1);
    assert_eq!(
        registry.stage("cook").unwrap().description_template,
        "Cook for {name}"
    );
}

#[test]
fn test_missing_catalog_file_is_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("missing.yaml");

    let error = StageRegistry::from_file(&path).unwrap_err();
    assert!(matches!(error, CatalogError::Read { .. }));
    assert!(error.to_string().contains("missing.yaml"));
    assert_eq!(AppError::from(error).code, ErrorCode::StorageError);
}

#[test]
fn test_no_configured_catalog_means_builtin() {
    let registry = StageRegistry::load(&PipelineSettings::default()).unwrap();
    assert_eq!(registry.all_stages().len(), 10);
}

#[test]
fn test_stage_lookups() {
    let registry = StageRegistry::builtin().unwrap();

    assert_eq!(registry.stage("assess_skin").unwrap().ordinal, 5);
    assert_eq!(
        registry.stage("analyze_data").unwrap().status,
        StageStatus::Inactive
    );
    assert!(matches!(
        registry.stage("bake_bread"),
        Err(PipelineError::NotFound { .. })
    ));

    assert!(registry.active_stage("assess_skin").is_ok());
    assert!(matches!(
        registry.active_stage("generate_report"),
        Err(PipelineError::InactiveStage { .. })
    ));
    assert!(matches!(
        registry.active_stage("bake_bread"),
        Err(PipelineError::NotFound { .. })
    ));
}
