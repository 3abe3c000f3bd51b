// ABOUTME: Field-level validation error collecting every violation of a form submission
// ABOUTME: Maps field names to human-readable reasons and converts into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use std::collections::BTreeMap;
use std::fmt;

use super::{AppError, ErrorCode};

/// Every field violation found in one validation pass
///
/// Keys are canonical field names; a field with several problems carries
/// them joined with `"; "`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    violations: BTreeMap<String, String>,
}

impl ValidationError {
    /// Create an empty error (no violations yet)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for `field`
    pub fn add(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        let reason = reason.into();
        self.violations
            .entry(field.into())
            .and_modify(|existing| {
                existing.push_str("; ");
                existing.push_str(&reason);
            })
            .or_insert(reason);
    }

    /// Whether no violation has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of invalid fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether `field` has at least one violation
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.violations.contains_key(field)
    }

    /// Reason recorded for `field`
    #[must_use]
    pub fn reason(&self, field: &str) -> Option<&str> {
        self.violations.get(field).map(String::as_str)
    }

    /// Invalid field names in sorted order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.keys().map(String::as_str)
    }

    /// Field name to reason mapping
    #[must_use]
    pub const fn violations(&self) -> &BTreeMap<String, String> {
        &self.violations
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one violation was recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s)", self.violations.len())?;
        for (index, (field, reason)) in self.violations.iter().enumerate() {
            let separator = if index == 0 { ": " } else { ", " };
            write!(f, "{separator}{field} ({reason})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        let details = serde_json::json!({ "fields": error.violations });
        Self::new(ErrorCode::InvalidInput, error.to_string()).with_details(details)
    }
}
