// ABOUTME: Environment configuration for the VitaCrew CLI and pipeline collaborators
// ABOUTME: Reads LLM endpoint, tool loop and stage catalog settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! Environment-based configuration
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ENVIRONMENT` | `development` |
//! | `VITACREW_LLM_BASE_URL` | `http://localhost:11434/v1` |
//! | `VITACREW_LLM_MODEL` | `qwen2.5:14b-instruct` |
//! | `VITACREW_LLM_API_KEY` | unset |
//! | `VITACREW_LLM_TEMPERATURE` | unset (provider default) |
//! | `VITACREW_LLM_MAX_TOKENS` | unset (provider default) |
//! | `VITACREW_MAX_TOOL_ROUNDS` | `5` |
//! | `VITACREW_STAGE_CATALOG` | unset (embedded catalog) |

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::agents::DEFAULT_MAX_TOOL_ROUNDS;
use crate::errors::{AppError, AppResult};

/// Base URL of the chat-completions endpoint
pub const LLM_BASE_URL_ENV: &str = "VITACREW_LLM_BASE_URL";
/// Model name sent with every request
pub const LLM_MODEL_ENV: &str = "VITACREW_LLM_MODEL";
/// Bearer token, empty means none
pub const LLM_API_KEY_ENV: &str = "VITACREW_LLM_API_KEY";
/// Sampling temperature
pub const LLM_TEMPERATURE_ENV: &str = "VITACREW_LLM_TEMPERATURE";
/// Completion token cap
pub const LLM_MAX_TOKENS_ENV: &str = "VITACREW_LLM_MAX_TOKENS";
/// Tool-call rounds allowed per stage
pub const MAX_TOOL_ROUNDS_ENV: &str = "VITACREW_MAX_TOOL_ROUNDS";
/// Path of a YAML catalog replacing the embedded one
pub const STAGE_CATALOG_ENV: &str = "VITACREW_STAGE_CATALOG";

/// Default base URL (Ollama)
const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
/// Default model for local inference
const DEFAULT_MODEL: &str = "qwen2.5:14b-instruct";

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Chat-completions endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Endpoint base URL, `/chat/completions` is appended
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Bearer token
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Completion token cap
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Stage execution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Tool-call rounds allowed before a stage gives up on tools
    pub max_tool_rounds: usize,
    /// Catalog file replacing the embedded catalog
    pub stage_catalog: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            stage_catalog: None,
        }
    }
}

/// Settings read once at start-up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitacrewConfig {
    /// Deployment environment
    pub environment: Environment,
    /// LLM endpoint
    pub llm: LlmSettings,
    /// Stage execution
    pub pipeline: PipelineSettings,
}

impl VitacrewConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a variable holds an unparsable or
    /// out-of-range value
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            llm: LlmSettings {
                base_url: env_var_or(LLM_BASE_URL_ENV, DEFAULT_BASE_URL),
                model: env_var_or(LLM_MODEL_ENV, DEFAULT_MODEL),
                api_key: env::var(LLM_API_KEY_ENV).ok().filter(|key| !key.is_empty()),
                temperature: parse_env(LLM_TEMPERATURE_ENV)?,
                max_tokens: parse_env(LLM_MAX_TOKENS_ENV)?,
            },
            pipeline: PipelineSettings {
                max_tool_rounds: parse_env(MAX_TOOL_ROUNDS_ENV)?
                    .unwrap_or(DEFAULT_MAX_TOOL_ROUNDS),
                stage_catalog: env::var(STAGE_CATALOG_ENV)
                    .ok()
                    .filter(|path| !path.trim().is_empty())
                    .map(PathBuf::from),
            },
        };
        config.validate()?;

        info!(
            environment = %config.environment,
            llm.base_url = %config.llm.base_url,
            llm.model = %config.llm.model,
            max_tool_rounds = config.pipeline.max_tool_rounds,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Validate value ranges
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid value
    pub fn validate(&self) -> AppResult<()> {
        if let Some(temperature) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(AppError::config(format!(
                    "{LLM_TEMPERATURE_ENV} must be between 0.0 and 2.0, got {temperature}"
                )));
            }
        }
        if self.llm.max_tokens == Some(0) {
            return Err(AppError::config(format!(
                "{LLM_MAX_TOKENS_ENV} must be greater than 0"
            )));
        }
        if self.pipeline.max_tool_rounds == 0 {
            return Err(AppError::config(format!(
                "{MAX_TOOL_ROUNDS_ENV} must be greater than 0"
            )));
        }
        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://")
        {
            return Err(AppError::config(format!(
                "{LLM_BASE_URL_ENV} must be an http(s) URL, got '{}'",
                self.llm.base_url
            )));
        }
        Ok(())
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: FromStr>(key: &str) -> AppResult<Option<T>> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::config(format!("Invalid {key} value: '{value}'"))),
        _ => Ok(None),
    }
}
