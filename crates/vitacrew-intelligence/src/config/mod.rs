// ABOUTME: Configuration module for the metrics engine
// ABOUTME: Global validated MetricsConfig loaded once from defaults plus environment overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Metrics Engine Configuration
//!
//! [`MetricsConfig::global`] is loaded on first use. Each coefficient can be
//! overridden through an environment variable:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `VITACREW_ACTIVITY_FACTOR_SEDENTARY` .. `VITACREW_ACTIVITY_FACTOR_VERY_ACTIVE` | activity factors |
//! | `VITACREW_MACROS_{MAINTENANCE,BULKING,CUTTING}_{PROTEIN,CARBS,FATS}` | ratio table |
//! | `VITACREW_KCAL_PER_G_{PROTEIN,CARBS,FATS}` | energy densities |
//!
//! An invalid override makes the whole load fail; the global instance then
//! falls back to the defaults and logs a warning.

mod error;
mod metrics;

pub use error::ConfigError;
pub use metrics::{
    ActivityFactorsConfig, BmrConfig, EnergyDensityConfig, HarrisBenedictCoefficients,
    MacroRatio, MacroRatioTable,
};

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Global configuration singleton
static METRICS_CONFIG: OnceLock<MetricsConfig> = OnceLock::new();

/// All coefficients used by the metrics engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Harris-Benedict coefficients
    pub bmr: BmrConfig,
    /// BMR multipliers per activity level
    pub activity_factors: ActivityFactorsConfig,
    /// Macro split per nutrition goal
    pub macro_ratios: MacroRatioTable,
    /// kcal per gram of each macronutrient
    pub energy_density: EnergyDensityConfig,
}

impl MetricsConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        METRICS_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load metrics config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Load configuration from defaults and environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an unparsable value
    /// or the resulting configuration fails validation
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a ratio row doesn't sum to 1.0, an energy density
    /// is not positive, or activity factors are out of range or not ascending
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.macro_ratios.validate()?;

        let density = &self.energy_density;
        if [density.protein, density.carbs, density.fats]
            .iter()
            .any(|value| !value.is_finite() || *value <= 0.0)
        {
            return Err(ConfigError::ValueOutOfRange(
                "Energy densities must be positive",
            ));
        }

        let factors = &self.activity_factors;
        if factors.sedentary < 1.0 || factors.very_active > 2.5 {
            return Err(ConfigError::ValueOutOfRange(
                "Activity factors must be between 1.0 and 2.5",
            ));
        }
        if factors.sedentary >= factors.light
            || factors.light >= factors.moderate
            || factors.moderate >= factors.active
            || factors.active >= factors.very_active
        {
            return Err(ConfigError::InvalidRange(
                "Activity factors must be in ascending order",
            ));
        }

        for coefficients in [&self.bmr.male, &self.bmr.female] {
            if coefficients.weight <= 0.0 || coefficients.height <= 0.0 {
                return Err(ConfigError::ValueOutOfRange(
                    "BMR weight and height coefficients must be positive",
                ));
            }
        }

        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    fn apply_ratio_overrides(goal: &str, ratio: &mut MacroRatio) -> Result<(), ConfigError> {
        Self::apply_env_var(
            &format!("VITACREW_MACROS_{goal}_PROTEIN"),
            &mut ratio.protein,
        )?;
        Self::apply_env_var(&format!("VITACREW_MACROS_{goal}_CARBS"), &mut ratio.carbs)?;
        Self::apply_env_var(&format!("VITACREW_MACROS_{goal}_FATS"), &mut ratio.fats)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Activity factors
        let factors = &mut self.activity_factors;
        Self::apply_env_var("VITACREW_ACTIVITY_FACTOR_SEDENTARY", &mut factors.sedentary)?;
        Self::apply_env_var("VITACREW_ACTIVITY_FACTOR_LIGHT", &mut factors.light)?;
        Self::apply_env_var("VITACREW_ACTIVITY_FACTOR_MODERATE", &mut factors.moderate)?;
        Self::apply_env_var("VITACREW_ACTIVITY_FACTOR_ACTIVE", &mut factors.active)?;
        Self::apply_env_var(
            "VITACREW_ACTIVITY_FACTOR_VERY_ACTIVE",
            &mut factors.very_active,
        )?;

        // Macro ratio table
        let table = &mut self.macro_ratios;
        Self::apply_ratio_overrides("MAINTENANCE", &mut table.maintenance)?;
        Self::apply_ratio_overrides("BULKING", &mut table.bulking)?;
        Self::apply_ratio_overrides("CUTTING", &mut table.cutting)?;

        // Energy densities
        let density = &mut self.energy_density;
        Self::apply_env_var("VITACREW_KCAL_PER_G_PROTEIN", &mut density.protein)?;
        Self::apply_env_var("VITACREW_KCAL_PER_G_CARBS", &mut density.carbs)?;
        Self::apply_env_var("VITACREW_KCAL_PER_G_FATS", &mut density.fats)?;

        Ok(self)
    }
}
