// ABOUTME: Input validator turning raw form fields into a UserProfile
// ABOUTME: Checks types, bounds and vocabularies, collecting every violation in one pass
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Input Validation
//!
//! The form collaborator hands over a JSON object mapping field names to
//! strings, numbers or lists. [`validate`] is the only way to build a
//! [`UserProfile`]; it never stops at the first problem, so the caller can
//! re-prompt for every invalid field at once.
//!
//! Normalization rules:
//! - `name` is trimmed before its length is checked
//! - numbers may be JSON numbers or numeric strings
//! - categorical values are trimmed and lower-cased; list duplicates collapse
//!   keeping the first occurrence, and list limits apply after that
//! - legacy aliases (`height`, `weight`, `waist_circumference`,
//!   `hip_circumference`) resolve to their canonical names
//! - unknown extra fields are ignored

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::constants::{fields, limits};
use crate::errors::ValidationError;
use crate::models::{
    ActivityLevel, DietaryRequirement, FitnessObjective, Gender, SkinConcern, SkinType,
    StressLevel, UnknownValue, UserProfile,
};

/// Validate a raw submission (must be a JSON object)
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every invalid field when `raw` is
/// not an object or when any field is missing, mistyped, out of bounds or
/// outside its vocabulary.
pub fn validate(raw: &Value) -> Result<UserProfile, ValidationError> {
    let Some(object) = raw.as_object() else {
        let mut errors = ValidationError::new();
        errors.add("input", "must be an object of field values");
        return Err(errors);
    };
    validate_fields(object)
}

/// Validate an already unpacked field map
///
/// # Errors
///
/// See [`validate`].
pub fn validate_fields(raw: &Map<String, Value>) -> Result<UserProfile, ValidationError> {
    let mut reader = FieldReader::new(raw);

    let name = reader.name();
    let age = reader.age();
    let gender = reader.choice::<Gender>(fields::GENDER);
    let height_cm = reader.bounded(fields::HEIGHT_CM, limits::HEIGHT_CM);
    let weight_kg = reader.bounded(fields::WEIGHT_KG, limits::WEIGHT_KG);
    let waist_cm = reader.bounded(fields::WAIST_CM, limits::WAIST_CM);
    let hip_cm = reader.bounded(fields::HIP_CM, limits::HIP_CM);
    let fitness_objectives = reader.list::<FitnessObjective>(
        fields::FITNESS_OBJECTIVES,
        ListRule::required(limits::MAX_FITNESS_OBJECTIVES),
    );
    let dietary_requirements =
        reader.list::<DietaryRequirement>(fields::DIETARY_REQUIREMENTS, ListRule::OPTIONAL);
    let skin_type = reader.choice::<SkinType>(fields::SKIN_TYPE);
    let skin_concerns = reader.list::<SkinConcern>(
        fields::SKIN_CONCERNS,
        ListRule::optional_max(limits::MAX_SKIN_CONCERNS),
    );
    let sleep_hours = reader.bounded(fields::SLEEP_HOURS, limits::SLEEP_HOURS);
    let stress_level = reader.choice::<StressLevel>(fields::STRESS_LEVEL);
    let activity_level = reader.choice::<ActivityLevel>(fields::ACTIVITY_LEVEL);

    let errors = reader.finish();
    let (
        Some(name),
        Some(age),
        Some(gender),
        Some(height_cm),
        Some(weight_kg),
        Some(waist_cm),
        Some(hip_cm),
        Some(fitness_objectives),
        Some(dietary_requirements),
        Some(skin_type),
        Some(skin_concerns),
        Some(sleep_hours),
        Some(stress_level),
        Some(activity_level),
    ) = (
        name,
        age,
        gender,
        height_cm,
        weight_kg,
        waist_cm,
        hip_cm,
        fitness_objectives,
        dietary_requirements,
        skin_type,
        skin_concerns,
        sleep_hours,
        stress_level,
        activity_level,
    )
    else {
        return Err(errors);
    };

    errors.into_result(|| UserProfile {
        name,
        age,
        gender,
        height_cm,
        weight_kg,
        waist_cm,
        hip_cm,
        fitness_objectives,
        dietary_requirements,
        skin_type,
        skin_concerns,
        sleep_hours,
        stress_level,
        activity_level,
    })
}

/// Cardinality rule for a categorical list field
#[derive(Debug, Clone, Copy)]
struct ListRule {
    required: bool,
    max: Option<usize>,
}

impl ListRule {
    const OPTIONAL: Self = Self {
        required: false,
        max: None,
    };

    const fn required(max: usize) -> Self {
        Self {
            required: true,
            max: Some(max),
        }
    }

    const fn optional_max(max: usize) -> Self {
        Self {
            required: false,
            max: Some(max),
        }
    }
}

/// Reads fields out of the raw map, recording violations as it goes
///
/// Every reader method returns `None` exactly when it recorded a violation.
struct FieldReader<'a> {
    raw: &'a Map<String, Value>,
    errors: ValidationError,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a Map<String, Value>) -> Self {
        Self {
            raw,
            errors: ValidationError::new(),
        }
    }

    fn finish(self) -> ValidationError {
        self.errors
    }

    /// Look a field up by canonical name, then by any legacy alias
    fn lookup(&self, field: &str) -> Option<&'a Value> {
        if let Some(value) = self.raw.get(field) {
            return Some(value);
        }
        fields::ALIASES
            .iter()
            .filter(|(_, canonical)| *canonical == field)
            .find_map(|(alias, _)| self.raw.get(*alias))
    }

    /// Present and non-null value, or record "is required"
    fn required(&mut self, field: &str) -> Option<&'a Value> {
        match self.lookup(field) {
            Some(Value::Null) | None => {
                self.errors.add(field, "is required");
                None
            }
            Some(value) => Some(value),
        }
    }

    fn name(&mut self) -> Option<String> {
        let value = self.required(fields::NAME)?;
        let Some(text) = value.as_str() else {
            self.errors.add(fields::NAME, "must be a string");
            return None;
        };
        let trimmed = text.trim();
        let length = trimmed.chars().count();
        if (limits::NAME_MIN_CHARS..=limits::NAME_MAX_CHARS).contains(&length) {
            Some(trimmed.to_owned())
        } else {
            self.errors.add(
                fields::NAME,
                format!(
                    "must be between {} and {} characters",
                    limits::NAME_MIN_CHARS,
                    limits::NAME_MAX_CHARS
                ),
            );
            None
        }
    }

    fn number(&mut self, field: &str) -> Option<f64> {
        let value = self.required(field)?;
        let parsed = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(number) if number.is_finite() => Some(number),
            Some(_) => {
                self.errors.add(field, "must be a finite number");
                None
            }
            None => {
                self.errors.add(field, "must be a number");
                None
            }
        }
    }

    fn bounded(&mut self, field: &str, (min, max): (f64, f64)) -> Option<f64> {
        let number = self.number(field)?;
        if (min..=max).contains(&number) {
            Some(number)
        } else {
            self.errors
                .add(field, format!("must be between {min} and {max}"));
            None
        }
    }

    fn age(&mut self) -> Option<u32> {
        let number = self.number(fields::AGE)?;
        if number.fract() != 0.0 {
            self.errors.add(fields::AGE, "must be a whole number");
            return None;
        }
        if number < f64::from(limits::AGE_MIN) || number > f64::from(limits::AGE_MAX) {
            self.errors.add(
                fields::AGE,
                format!(
                    "must be between {} and {}",
                    limits::AGE_MIN,
                    limits::AGE_MAX
                ),
            );
            return None;
        }
        // Range checked above, the cast is exact
        Some(number as u32)
    }

    fn choice<T>(&mut self, field: &str) -> Option<T>
    where
        T: FromStr<Err = UnknownValue>,
    {
        let value = self.required(field)?;
        let Some(text) = value.as_str() else {
            self.errors.add(field, "must be a string");
            return None;
        };
        match text.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(unknown) => {
                self.errors
                    .add(field, format!("must be one of: {}", unknown.allowed));
                None
            }
        }
    }

    fn list<T>(&mut self, field: &str, rule: ListRule) -> Option<Vec<T>>
    where
        T: FromStr<Err = UnknownValue> + PartialEq,
    {
        let value = match self.lookup(field) {
            Some(Value::Null) | None if !rule.required => return Some(Vec::new()),
            Some(Value::Null) | None => {
                self.errors.add(field, "is required");
                return None;
            }
            Some(value) => value,
        };
        let Some(entries) = value.as_array() else {
            self.errors.add(field, "must be a list of strings");
            return None;
        };

        let mut parsed: Vec<T> = Vec::with_capacity(entries.len());
        let mut rejected: Vec<String> = Vec::new();
        let mut allowed = None;
        let mut non_string = false;
        for entry in entries {
            let Some(text) = entry.as_str() else {
                non_string = true;
                continue;
            };
            match text.parse::<T>() {
                Ok(item) if !parsed.contains(&item) => parsed.push(item),
                Ok(_) => {}
                Err(unknown) => {
                    rejected.push(format!("'{}'", text.trim()));
                    allowed.get_or_insert(unknown.allowed);
                }
            }
        }

        let mut failed = false;
        if non_string {
            self.errors.add(field, "entries must be strings");
            failed = true;
        }
        if let Some(allowed) = allowed {
            self.errors.add(
                field,
                format!("{} not allowed (allowed: {allowed})", rejected.join(", ")),
            );
            failed = true;
        }
        if rule.required && !failed && parsed.is_empty() {
            self.errors.add(field, "must contain at least one value");
            failed = true;
        }
        if let Some(max) = rule.max.filter(|max| parsed.len() > *max) {
            self.errors
                .add(field, format!("must contain at most {max} distinct values"));
            failed = true;
        }

        (!failed).then_some(parsed)
    }
}
