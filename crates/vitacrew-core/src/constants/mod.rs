// ABOUTME: Application-wide constants for profile validation bounds and field names
// ABOUTME: Single source of truth for the limits enforced when a user profile is built
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! Constants organized by domain

/// Inclusive bounds enforced on profile fields
pub mod limits {
    /// Minimum name length in characters (after trimming)
    pub const NAME_MIN_CHARS: usize = 2;
    /// Maximum name length in characters (after trimming)
    pub const NAME_MAX_CHARS: usize = 50;

    /// Youngest supported user (years)
    pub const AGE_MIN: u32 = 18;
    /// Oldest supported user (years)
    pub const AGE_MAX: u32 = 120;

    /// Height range (cm)
    pub const HEIGHT_CM: (f64, f64) = (100.0, 250.0);
    /// Weight range (kg)
    pub const WEIGHT_KG: (f64, f64) = (30.0, 300.0);
    /// Waist circumference range (cm)
    pub const WAIST_CM: (f64, f64) = (40.0, 200.0);
    /// Hip circumference range (cm)
    pub const HIP_CM: (f64, f64) = (40.0, 200.0);
    /// Sleep per night (hours)
    pub const SLEEP_HOURS: (f64, f64) = (0.0, 24.0);

    /// Maximum number of distinct fitness objectives
    pub const MAX_FITNESS_OBJECTIVES: usize = 5;
    /// Maximum number of distinct skin concerns
    pub const MAX_SKIN_CONCERNS: usize = 5;
}

/// Canonical field names of the raw form submission
pub mod fields {
    /// Display name
    pub const NAME: &str = "name";
    /// Age in years
    pub const AGE: &str = "age";
    /// Gender
    pub const GENDER: &str = "gender";
    /// Height in centimetres
    pub const HEIGHT_CM: &str = "height_cm";
    /// Weight in kilograms
    pub const WEIGHT_KG: &str = "weight_kg";
    /// Waist circumference in centimetres
    pub const WAIST_CM: &str = "waist_cm";
    /// Hip circumference in centimetres
    pub const HIP_CM: &str = "hip_cm";
    /// Fitness objectives list
    pub const FITNESS_OBJECTIVES: &str = "fitness_objectives";
    /// Dietary requirements list
    pub const DIETARY_REQUIREMENTS: &str = "dietary_requirements";
    /// Skin type
    pub const SKIN_TYPE: &str = "skin_type";
    /// Skin concerns list
    pub const SKIN_CONCERNS: &str = "skin_concerns";
    /// Sleep hours per night
    pub const SLEEP_HOURS: &str = "sleep_hours";
    /// Stress level
    pub const STRESS_LEVEL: &str = "stress_level";
    /// Activity level
    pub const ACTIVITY_LEVEL: &str = "activity_level";

    /// Alternative names accepted from older form payloads, mapped to canonical names
    pub const ALIASES: &[(&str, &str)] = &[
        ("height", HEIGHT_CM),
        ("weight", WEIGHT_KG),
        ("waist_circumference", WAIST_CM),
        ("hip_circumference", HIP_CM),
    ];
}

/// Service identity used in logs
pub mod service_names {
    /// Name reported by the CLI and logging layer
    pub const VITACREW: &str = "vitacrew";
}
