// ABOUTME: Deterministic health metrics: Harris-Benedict BMR and macronutrient split
// ABOUTME: Pure functions over a validated profile and a MetricsConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # Metrics Engine
//!
//! - BMR uses the revised Harris-Benedict equation. `other` falls back to
//!   the female coefficients. Results are rounded to 2 decimals and are
//!   never clamped, so extreme inputs may yield a non-physical value.
//! - Macro grams are `calories * fraction / kcal_per_gram`, rounded to 1
//!   decimal with exact ties going to the even digit. Unknown goal labels use the maintenance split.
//! - The default calorie target is BMR times the activity factor, rounded
//!   to whole kcal.

use vitacrew_core::errors::{AppError, AppResult};
use vitacrew_core::models::{Gender, Goal, HealthMetrics, MacroTargets, UserProfile};

use crate::config::MetricsConfig;

/// Round `value` to `decimals` decimal places, exact ties to the even digit
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Metrics calculator bound to one configuration
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine<'a> {
    config: &'a MetricsConfig,
}

impl MetricsEngine<'static> {
    /// Engine using [`MetricsConfig::global`]
    #[must_use]
    pub fn global() -> Self {
        Self::new(MetricsConfig::global())
    }
}

impl<'a> MetricsEngine<'a> {
    /// Engine using an explicit configuration
    #[must_use]
    pub const fn new(config: &'a MetricsConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &'a MetricsConfig {
        self.config
    }

    /// Basal metabolic rate in kcal/day, rounded to 2 decimal places
    #[must_use]
    pub fn compute_bmr(&self, weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
        let coefficients = match gender {
            Gender::Male => &self.config.bmr.male,
            Gender::Female | Gender::Other => &self.config.bmr.female,
        };
        let weight_component = coefficients.weight * weight_kg;
        let height_component = coefficients.height * height_cm;
        let age_component = coefficients.age * f64::from(age_years);

        round_to(
            coefficients.constant + weight_component + height_component - age_component,
            2,
        )
    }

    /// Macro grams for a calorie target and a free-form goal label
    ///
    /// The label is matched case-insensitively; anything unknown uses the
    /// maintenance split.
    #[must_use]
    pub fn compute_macros(&self, calories: f64, goal: &str) -> MacroTargets {
        self.macros_for_goal(calories, Goal::from_label(goal))
    }

    /// Macro grams for a calorie target and a parsed goal
    #[must_use]
    pub fn macros_for_goal(&self, calories: f64, goal: Goal) -> MacroTargets {
        let ratio = self.config.macro_ratios.ratio(goal);
        let density = &self.config.energy_density;
        MacroTargets {
            protein_g: round_to(calories * ratio.protein / density.protein, 1),
            carbs_g: round_to(calories * ratio.carbs / density.carbs, 1),
            fats_g: round_to(calories * ratio.fats / density.fats, 1),
        }
    }

    /// Daily energy expenditure estimate used when no calorie target is given
    #[must_use]
    pub fn default_calorie_target(&self, profile: &UserProfile, bmr_kcal_per_day: f64) -> f64 {
        let factor = self
            .config
            .activity_factors
            .factor(profile.activity_level());
        round_to(bmr_kcal_per_day * factor, 0)
    }

    /// Compute every metric attached to a pipeline run
    ///
    /// `calorie_target` defaults to BMR times the activity factor, `goal`
    /// defaults to the goal implied by the profile's fitness objectives.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when an explicit calorie target is not a
    /// positive finite number.
    pub fn compute_health_metrics(
        &self,
        profile: &UserProfile,
        calorie_target: Option<f64>,
        goal: Option<&str>,
    ) -> AppResult<HealthMetrics> {
        if let Some(calories) = calorie_target {
            if !calories.is_finite() || calories <= 0.0 {
                return Err(AppError::invalid_input(format!(
                    "Calorie target must be a positive number, got {calories}"
                )));
            }
        }

        let bmr = self.compute_bmr(
            profile.weight_kg(),
            profile.height_cm(),
            profile.age(),
            profile.gender(),
        );
        let calories =
            calorie_target.unwrap_or_else(|| self.default_calorie_target(profile, bmr));
        let goal = goal.map_or_else(
            || Goal::from_objectives(profile.fitness_objectives()),
            Goal::from_label,
        );
        let macros = self.macros_for_goal(calories, goal);

        tracing::debug!(
            bmr_kcal_per_day = bmr,
            calorie_target_kcal = calories,
            goal = %goal,
            "Computed health metrics"
        );

        Ok(HealthMetrics::new(bmr, calories, goal, macros))
    }
}

/// [`MetricsEngine::compute_bmr`] with the global configuration
#[must_use]
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
    MetricsEngine::global().compute_bmr(weight_kg, height_cm, age_years, gender)
}

/// [`MetricsEngine::compute_macros`] with the global configuration
#[must_use]
pub fn compute_macros(calories: f64, goal: &str) -> MacroTargets {
    MetricsEngine::global().compute_macros(calories, goal)
}

/// [`MetricsEngine::compute_health_metrics`] with the global configuration
///
/// # Errors
///
/// See [`MetricsEngine::compute_health_metrics`].
pub fn compute_health_metrics(
    profile: &UserProfile,
    calorie_target: Option<f64>,
    goal: Option<&str>,
) -> AppResult<HealthMetrics> {
    MetricsEngine::global().compute_health_metrics(profile, calorie_target, goal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert!((round_to(1695.667, 2) - 1695.67).abs() < f64::EPSILON);
        assert!((round_to(66.666, 1) - 66.7).abs() < f64::EPSILON);
        assert!((round_to(125.25, 1) - 125.2).abs() < f64::EPSILON);
        assert!((round_to(225.75, 1) - 225.8).abs() < f64::EPSILON);
        assert!((round_to(0.25, 1) - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_other_uses_female_coefficients() {
        let config = MetricsConfig::default();
        let engine = MetricsEngine::new(&config);
        let female = engine.compute_bmr(60.0, 165.0, 40, Gender::Female);
        let other = engine.compute_bmr(60.0, 165.0, 40, Gender::Other);
        assert!((female - other).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bmr_is_not_clamped() {
        let config = MetricsConfig::default();
        let engine = MetricsEngine::new(&config);
        assert!(engine.compute_bmr(0.0, 0.0, 200, Gender::Male) < 0.0);
    }
}
