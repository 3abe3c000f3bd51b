// ABOUTME: Coefficient tables used by the health metrics engine
// ABOUTME: Harris-Benedict coefficients, activity factors, macro ratio table and energy densities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! Metrics Configuration
//!
//! Defaults reproduce the revised Harris-Benedict equation (Roza & Shizgal,
//! 1984) and the usual Atwater energy densities of 4/4/9 kcal per gram.

use serde::{Deserialize, Serialize};
use vitacrew_core::models::{ActivityLevel, Goal};

use super::ConfigError;

/// Tolerance applied when checking that a ratio row sums to 1.0
const RATIO_SUM_TOLERANCE: f64 = 1e-9;

/// Harris-Benedict coefficients for one sex
///
/// `bmr = constant + weight * weight_kg + height * height_cm - age * age_years`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarrisBenedictCoefficients {
    /// Constant term (kcal/day)
    pub constant: f64,
    /// Multiplier for weight in kg
    pub weight: f64,
    /// Multiplier for height in cm
    pub height: f64,
    /// Multiplier for age in years (subtracted)
    pub age: f64,
}

/// BMR coefficients per gender
///
/// There is no dedicated formula for `other`; it uses the female coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmrConfig {
    /// Male coefficients
    pub male: HarrisBenedictCoefficients,
    /// Female (and other) coefficients
    pub female: HarrisBenedictCoefficients,
}

impl Default for BmrConfig {
    fn default() -> Self {
        Self {
            male: HarrisBenedictCoefficients {
                constant: 88.362,
                weight: 13.397,
                height: 4.799,
                age: 5.677,
            },
            female: HarrisBenedictCoefficients {
                constant: 447.593,
                weight: 9.247,
                height: 3.098,
                age: 4.330,
            },
        }
    }
}

/// Multipliers turning BMR into daily energy expenditure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityFactorsConfig {
    /// Little or no exercise
    pub sedentary: f64,
    /// 1-3 days/week
    pub light: f64,
    /// 3-5 days/week
    pub moderate: f64,
    /// 6-7 days/week
    pub active: f64,
    /// Hard daily training
    pub very_active: f64,
}

impl ActivityFactorsConfig {
    /// Factor for an activity level
    #[must_use]
    pub const fn factor(&self, level: ActivityLevel) -> f64 {
        match level {
            ActivityLevel::Sedentary => self.sedentary,
            ActivityLevel::Light => self.light,
            ActivityLevel::Moderate => self.moderate,
            ActivityLevel::Active => self.active,
            ActivityLevel::VeryActive => self.very_active,
        }
    }
}

impl Default for ActivityFactorsConfig {
    fn default() -> Self {
        Self {
            sedentary: 1.2,
            light: 1.375,
            moderate: 1.55,
            active: 1.725,
            very_active: 1.9,
        }
    }
}

/// Fractions of daily calories taken from each macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatio {
    /// Protein fraction
    pub protein: f64,
    /// Carbohydrate fraction
    pub carbs: f64,
    /// Fat fraction
    pub fats: f64,
}

impl MacroRatio {
    /// Build a ratio row
    #[must_use]
    pub const fn new(protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            protein,
            carbs,
            fats,
        }
    }

    /// Sum of the three fractions
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.protein + self.carbs + self.fats
    }
}

/// Macro split for every nutrition goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatioTable {
    /// Maintenance split, also used for unknown goals
    pub maintenance: MacroRatio,
    /// Surplus split
    pub bulking: MacroRatio,
    /// Deficit split
    pub cutting: MacroRatio,
}

impl MacroRatioTable {
    /// Ratio row for a goal
    #[must_use]
    pub const fn ratio(&self, goal: Goal) -> MacroRatio {
        match goal {
            Goal::Maintenance => self.maintenance,
            Goal::Bulking => self.bulking,
            Goal::Cutting => self.cutting,
        }
    }

    /// Check every row sums to 1.0 and holds no negative fraction
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidWeights` naming the first offending goal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for goal in Goal::ALL {
            let ratio = self.ratio(*goal);
            if [ratio.protein, ratio.carbs, ratio.fats]
                .iter()
                .any(|fraction| !(0.0..=1.0).contains(fraction))
            {
                return Err(ConfigError::InvalidWeights(format!(
                    "{goal} macro fractions must each be between 0 and 1"
                )));
            }
            let sum = ratio.sum();
            if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
                return Err(ConfigError::InvalidWeights(format!(
                    "{goal} macro fractions must sum to 1.0, got {sum}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for MacroRatioTable {
    fn default() -> Self {
        Self {
            maintenance: MacroRatio::new(0.3, 0.4, 0.3),
            bulking: MacroRatio::new(0.25, 0.5, 0.25),
            cutting: MacroRatio::new(0.4, 0.3, 0.3),
        }
    }
}

/// Energy per gram of each macronutrient (kcal/g)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyDensityConfig {
    /// Protein
    pub protein: f64,
    /// Carbohydrates
    pub carbs: f64,
    /// Fats
    pub fats: f64,
}

impl Default for EnergyDensityConfig {
    fn default() -> Self {
        Self {
            protein: 4.0,
            carbs: 4.0,
            fats: 9.0,
        }
    }
}
