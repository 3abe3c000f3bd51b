// ABOUTME: Validated, immutable user profile built from a raw form submission
// ABOUTME: Fields are private and only reachable through accessors; deserialization re-validates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::vocabulary::{
    ActivityLevel, DietaryRequirement, FitnessObjective, Gender, SkinConcern, SkinType,
    StressLevel,
};
use crate::errors::ValidationError;
use crate::validation;

/// Biometric and preference data for one user
///
/// A `UserProfile` can only be obtained from [`validation::validate`] (or by
/// deserializing, which goes through the same validator), so every instance
/// satisfies the documented field bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct UserProfile {
    pub(crate) name: String,
    pub(crate) age: u32,
    pub(crate) gender: Gender,
    pub(crate) height_cm: f64,
    pub(crate) weight_kg: f64,
    pub(crate) waist_cm: f64,
    pub(crate) hip_cm: f64,
    pub(crate) fitness_objectives: Vec<FitnessObjective>,
    pub(crate) dietary_requirements: Vec<DietaryRequirement>,
    pub(crate) skin_type: SkinType,
    pub(crate) skin_concerns: Vec<SkinConcern>,
    pub(crate) sleep_hours: f64,
    pub(crate) stress_level: StressLevel,
    pub(crate) activity_level: ActivityLevel,
}

impl UserProfile {
    /// Display name, trimmed
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Age in whole years
    #[must_use]
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Gender
    #[must_use]
    pub const fn gender(&self) -> Gender {
        self.gender
    }

    /// Height in centimetres
    #[must_use]
    pub const fn height_cm(&self) -> f64 {
        self.height_cm
    }

    /// Weight in kilograms
    #[must_use]
    pub const fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    /// Waist circumference in centimetres
    #[must_use]
    pub const fn waist_cm(&self) -> f64 {
        self.waist_cm
    }

    /// Hip circumference in centimetres
    #[must_use]
    pub const fn hip_cm(&self) -> f64 {
        self.hip_cm
    }

    /// Fitness objectives in submission order, without duplicates
    #[must_use]
    pub fn fitness_objectives(&self) -> &[FitnessObjective] {
        &self.fitness_objectives
    }

    /// Dietary requirements in submission order, without duplicates
    #[must_use]
    pub fn dietary_requirements(&self) -> &[DietaryRequirement] {
        &self.dietary_requirements
    }

    /// Skin type
    #[must_use]
    pub const fn skin_type(&self) -> SkinType {
        self.skin_type
    }

    /// Skin concerns in submission order, without duplicates
    #[must_use]
    pub fn skin_concerns(&self) -> &[SkinConcern] {
        &self.skin_concerns
    }

    /// Average sleep per night in hours
    #[must_use]
    pub const fn sleep_hours(&self) -> f64 {
        self.sleep_hours
    }

    /// Stress level
    #[must_use]
    pub const fn stress_level(&self) -> StressLevel {
        self.stress_level
    }

    /// Activity level
    #[must_use]
    pub const fn activity_level(&self) -> ActivityLevel {
        self.activity_level
    }

    /// Waist-to-hip ratio rounded to 2 decimal places
    #[must_use]
    pub fn waist_to_hip_ratio(&self) -> f64 {
        (self.waist_cm / self.hip_cm * 100.0).round_ties_even() / 100.0
    }
}

impl TryFrom<Map<String, Value>> for UserProfile {
    type Error = ValidationError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        validation::validate_fields(&fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw() -> Value {
        json!({
            "name": "Test User",
            "age": 30,
            "gender": "male",
            "height_cm": 175.0,
            "weight_kg": 70.0,
            "waist_cm": 80.0,
            "hip_cm": 90.0,
            "fitness_objectives": ["weight loss", "muscle gain"],
            "dietary_requirements": ["none"],
            "skin_type": "dry",
            "skin_concerns": ["none"],
            "sleep_hours": 7.5,
            "stress_level": "moderate",
            "activity_level": "moderate"
        })
    }

    #[test]
    fn test_serde_round_trip_goes_through_validator() {
        let profile = validation::validate(&raw()).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        let back: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_deserialize_rejects_out_of_bounds() {
        let mut value = raw();
        value["age"] = json!(12);
        let result: Result<UserProfile, _> = serde_json::from_value(value);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("age"), "unexpected message: {message}");
    }

    #[test]
    fn test_waist_to_hip_ratio() {
        let profile = validation::validate(&raw()).unwrap();
        assert!((profile.waist_to_hip_ratio() - 0.89).abs() < f64::EPSILON);
    }
}
