// ABOUTME: Stage and agent definitions forming the fixed, ordered wellness-plan catalog
// ABOUTME: Definitions are loaded once into an immutable StageRegistry shared by reference
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Stage Catalog
//!
//! Stages are units of the ordered pipeline; each one is delegated to an
//! agent role. A stage can be defined but inactive: it stays addressable by
//! id (and `run_one` reports it as inactive) but is skipped by full runs.

mod registry;

pub use registry::{CatalogError, StageRegistry, BUILTIN_CATALOG};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tools::AgentTool;

/// Whether a defined stage takes part in a full run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Runs as part of `run_all`
    Active,
    /// Defined and addressable, excluded from `run_all`
    Inactive,
}

impl StageStatus {
    /// Check if the stage is active
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// External agent role a stage is delegated to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Unique role identifier referenced by stages
    pub role: String,
    /// Human-readable name
    pub display_name: String,
    /// What the agent is trying to achieve
    pub goal: String,
    /// Persona background
    pub backstory: String,
    /// Calculator tools the agent may call
    #[serde(default)]
    pub tools: Vec<AgentTool>,
}

impl AgentDefinition {
    /// Agent without tools
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        display_name: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            display_name: display_name.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Vec::new(),
        }
    }

    /// Grant tools
    #[must_use]
    pub fn with_tools(mut self, tools: &[AgentTool]) -> Self {
        self.tools = tools.to_vec();
        self
    }

    /// Check whether the agent may call `tool`
    #[must_use]
    pub fn can_use(&self, tool: AgentTool) -> bool {
        self.tools.contains(&tool)
    }
}

/// One unit of the ordered pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Unique stable identifier
    pub stage_id: String,
    /// Execution position, unique within the catalog
    pub ordinal: u32,
    /// Role of the agent the stage is delegated to
    pub delegated_role: String,
    /// Task description with `{placeholder}` references, opaque to the runner
    pub description_template: String,
    /// Description of the result the agent should produce, opaque to the runner
    pub expected_output: String,
    /// Whether the stage takes part in full runs
    pub status: StageStatus,
}

impl StageDefinition {
    /// Active stage with no expected output text
    #[must_use]
    pub fn new(
        stage_id: impl Into<String>,
        ordinal: u32,
        delegated_role: impl Into<String>,
        description_template: impl Into<String>,
    ) -> Self {
        Self {
            stage_id: stage_id.into(),
            ordinal,
            delegated_role: delegated_role.into(),
            description_template: description_template.into(),
            expected_output: String::new(),
            status: StageStatus::Active,
        }
    }

    /// Set the expected output text
    #[must_use]
    pub fn with_expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    /// Mark the stage as defined but inactive
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.status = StageStatus::Inactive;
        self
    }

    /// Check if the stage takes part in full runs
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
