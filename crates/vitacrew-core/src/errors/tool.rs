// ABOUTME: Error types for calculator tools invoked by agents during stage execution
// ABOUTME: Provides structured errors that integrate with the main AppError system
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Tool Error Types
//!
//! Agents may call the local calculator tools while working on a stage.
//! Failures are reported back to the agent as tool results, so they need a
//! stable, readable shape rather than an opaque `AppError`.

use std::error::Error;
use std::fmt;

use super::{AppError, ErrorCode};

/// Errors specific to tool operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Tool name is not known
    NotFound {
        /// Name of the requested tool
        tool_name: String,
    },
    /// Tool exists but the calling agent role may not use it
    NotPermitted {
        /// Name of the tool
        tool_name: String,
        /// Role that attempted the call
        role: String,
    },
    /// Tool parameter validation failed
    InvalidParameter {
        /// Name of the tool
        tool_name: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Reason the parameter is invalid
        reason: String,
    },
    /// Required parameter is missing
    MissingParameter {
        /// Name of the tool
        tool_name: String,
        /// Name of the missing parameter
        parameter: String,
    },
}

impl ToolError {
    /// Create a "not found" error
    #[must_use]
    pub fn not_found(tool_name: impl Into<String>) -> Self {
        Self::NotFound {
            tool_name: tool_name.into(),
        }
    }

    /// Create a "not permitted" error
    #[must_use]
    pub fn not_permitted(tool_name: impl Into<String>, role: impl Into<String>) -> Self {
        Self::NotPermitted {
            tool_name: tool_name.into(),
            role: role.into(),
        }
    }

    /// Create an "invalid parameter" error
    #[must_use]
    pub fn invalid_parameter(
        tool_name: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            tool_name: tool_name.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a "missing parameter" error
    #[must_use]
    pub fn missing_parameter(tool_name: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            tool_name: tool_name.into(),
            parameter: parameter.into(),
        }
    }

    /// Get the tool name associated with this error
    #[must_use]
    pub fn tool_name(&self) -> &str {
        match self {
            Self::NotFound { tool_name }
            | Self::NotPermitted { tool_name, .. }
            | Self::InvalidParameter { tool_name, .. }
            | Self::MissingParameter { tool_name, .. } => tool_name,
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { tool_name } => write!(f, "Tool '{tool_name}' not found"),
            Self::NotPermitted { tool_name, role } => {
                write!(f, "Tool '{tool_name}' is not available to role '{role}'")
            }
            Self::InvalidParameter {
                tool_name,
                parameter,
                reason,
            } => write!(
                f,
                "Invalid parameter '{parameter}' for tool '{tool_name}': {reason}"
            ),
            Self::MissingParameter {
                tool_name,
                parameter,
            } => write!(
                f,
                "Missing required parameter '{parameter}' for tool '{tool_name}'"
            ),
        }
    }
}

impl Error for ToolError {}

impl From<ToolError> for AppError {
    fn from(error: ToolError) -> Self {
        let code = match &error {
            ToolError::NotFound { .. } => ErrorCode::ResourceNotFound,
            ToolError::NotPermitted { .. } => ErrorCode::ResourceUnavailable,
            ToolError::InvalidParameter { .. } => ErrorCode::InvalidInput,
            ToolError::MissingParameter { .. } => ErrorCode::MissingRequiredField,
        };
        Self::new(code, error.to_string())
            .with_details(serde_json::json!({ "tool": error.tool_name() }))
    }
}
