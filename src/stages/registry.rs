// ABOUTME: Immutable registry of stage and agent definitions loaded from a YAML catalog
// ABOUTME: Validates unique ids, unique ordinals and known roles once at load time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::{AgentDefinition, StageDefinition, StageStatus};
use crate::config::PipelineSettings;
use crate::errors::{AppError, ErrorCode};
use crate::pipeline::PipelineError;

/// Catalog shipped with the binary
pub const BUILTIN_CATALOG: &str = include_str!("../../config/stages.yaml");

/// Problems found while loading a stage catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("Failed to read stage catalog {}: {source}", path.display())]
    Read {
        /// Catalog path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Catalog is not valid YAML or has an unexpected shape
    #[error("Invalid stage catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// Catalog defines no stage
    #[error("Stage catalog defines no stages")]
    Empty,
    /// Two stages share an id
    #[error("Duplicate stage id '{0}'")]
    DuplicateStageId(String),
    /// Two stages share an ordinal
    #[error("Stages '{first}' and '{second}' share ordinal {ordinal}")]
    DuplicateOrdinal {
        /// Shared ordinal
        ordinal: u32,
        /// Stage defined first
        first: String,
        /// Stage defined second
        second: String,
    },
    /// Two agents share a role
    #[error("Duplicate agent role '{0}'")]
    DuplicateRole(String),
    /// A stage is delegated to a role no agent defines
    #[error("Stage '{stage_id}' is delegated to unknown role '{role}'")]
    UnknownRole {
        /// Offending stage
        stage_id: String,
        /// Role it names
        role: String,
    },
    /// A required text field is blank
    #[error("Stage '{stage_id}' has an empty {field}")]
    EmptyField {
        /// Offending stage (may itself be blank)
        stage_id: String,
        /// Blank field name
        field: &'static str,
    },
}

impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        let code = match &error {
            CatalogError::Read { .. } => ErrorCode::StorageError,
            _ => ErrorCode::ConfigInvalid,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

/// Catalog file layout
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    agents: Vec<AgentDefinition>,
    stages: Vec<StageEntry>,
}

/// Stage as written in the catalog file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StageEntry {
    id: String,
    ordinal: u32,
    role: String,
    description: String,
    #[serde(default)]
    expected_output: String,
    #[serde(default = "default_active")]
    active: bool,
}

const fn default_active() -> bool {
    true
}

impl From<StageEntry> for StageDefinition {
    fn from(entry: StageEntry) -> Self {
        Self {
            stage_id: entry.id,
            ordinal: entry.ordinal,
            delegated_role: entry.role,
            description_template: entry.description.trim().to_owned(),
            expected_output: entry.expected_output.trim().to_owned(),
            status: if entry.active {
                StageStatus::Active
            } else {
                StageStatus::Inactive
            },
        }
    }
}

/// Fixed, ordered catalog of stages and the agents they are delegated to
///
/// Built once, then shared as `Arc<StageRegistry>`; there is no way to
/// register or modify a stage afterwards.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    agents: Vec<AgentDefinition>,
    stages: Vec<StageDefinition>,
    index: HashMap<String, usize>,
}

impl StageRegistry {
    /// Build a registry from definitions, validating them
    ///
    /// Stages are stored in ascending ordinal order regardless of input order.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` for an empty catalog, duplicate stage ids,
    /// ordinals or roles, blank fields, or stages naming an unknown role.
    pub fn new(
        agents: Vec<AgentDefinition>,
        mut stages: Vec<StageDefinition>,
    ) -> Result<Self, CatalogError> {
        if stages.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut roles = HashSet::new();
        for agent in &agents {
            if !roles.insert(agent.role.as_str()) {
                return Err(CatalogError::DuplicateRole(agent.role.clone()));
            }
        }

        stages.sort_by_key(|stage| stage.ordinal);
        for pair in stages.windows(2) {
            if pair[0].ordinal == pair[1].ordinal {
                return Err(CatalogError::DuplicateOrdinal {
                    ordinal: pair[0].ordinal,
                    first: pair[0].stage_id.clone(),
                    second: pair[1].stage_id.clone(),
                });
            }
        }

        let mut index = HashMap::with_capacity(stages.len());
        for (position, stage) in stages.iter().enumerate() {
            Self::check_fields(stage)?;
            if !roles.contains(stage.delegated_role.as_str()) {
                return Err(CatalogError::UnknownRole {
                    stage_id: stage.stage_id.clone(),
                    role: stage.delegated_role.clone(),
                });
            }
            if index.insert(stage.stage_id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateStageId(stage.stage_id.clone()));
            }
        }

        debug!(
            stages = stages.len(),
            agents = agents.len(),
            "Stage catalog validated"
        );
        Ok(Self {
            agents,
            stages,
            index,
        })
    }

    fn check_fields(stage: &StageDefinition) -> Result<(), CatalogError> {
        let blank = |field: &'static str| CatalogError::EmptyField {
            stage_id: stage.stage_id.clone(),
            field,
        };
        if stage.stage_id.trim().is_empty() {
            return Err(blank("id"));
        }
        if stage.description_template.trim().is_empty() {
            return Err(blank("description"));
        }
        Ok(())
    }

    /// Parse and validate a YAML catalog
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed YAML (including unknown
    /// tool names) and any validation error of [`StageRegistry::new`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(
            file.agents,
            file.stages.into_iter().map(StageDefinition::from).collect(),
        )
    }

    /// Load and validate a YAML catalog file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Read` if the file cannot be read, otherwise as
    /// [`StageRegistry::from_yaml_str`].
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_yaml_str(&yaml)?;
        info!(path = %path.display(), "Loaded stage catalog from file");
        Ok(registry)
    }

    /// The catalog embedded in the binary
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` only if the embedded catalog is broken.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// The configured catalog file, or the embedded catalog when none is set
    ///
    /// # Errors
    ///
    /// See [`StageRegistry::from_file`].
    pub fn load(settings: &PipelineSettings) -> Result<Self, CatalogError> {
        settings
            .stage_catalog
            .as_deref()
            .map_or_else(Self::builtin, Self::from_file)
    }

    /// Every defined stage in ascending ordinal order, inactive ones included
    #[must_use]
    pub fn all_stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Stages taking part in full runs, in ascending ordinal order
    pub fn active_stages(&self) -> impl Iterator<Item = &StageDefinition> {
        self.stages.iter().filter(|stage| stage.is_active())
    }

    /// Look a stage up by id
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::NotFound` for an id the catalog does not define.
    pub fn stage(&self, stage_id: &str) -> Result<&StageDefinition, PipelineError> {
        self.index
            .get(stage_id)
            .map(|&position| &self.stages[position])
            .ok_or_else(|| PipelineError::NotFound {
                stage_id: stage_id.to_owned(),
            })
    }

    /// Look a stage up by id, requiring it to be active
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::NotFound` for an unknown id and
    /// `PipelineError::InactiveStage` for a defined but inactive stage.
    pub fn active_stage(&self, stage_id: &str) -> Result<&StageDefinition, PipelineError> {
        let stage = self.stage(stage_id)?;
        if stage.is_active() {
            Ok(stage)
        } else {
            Err(PipelineError::InactiveStage {
                stage_id: stage_id.to_owned(),
            })
        }
    }

    /// Agent definition for a role
    #[must_use]
    pub fn agent(&self, role: &str) -> Option<&AgentDefinition> {
        self.agents.iter().find(|agent| agent.role == role)
    }

    /// Every agent definition in catalog order
    #[must_use]
    pub fn agents(&self) -> &[AgentDefinition] {
        &self.agents
    }
}
