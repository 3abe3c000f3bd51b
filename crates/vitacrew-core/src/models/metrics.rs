// ABOUTME: Derived health metrics attached to a pipeline run
// ABOUTME: Basal metabolic rate, calorie target, nutrition goal and macronutrient grams
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use serde::{Deserialize, Serialize};

use super::vocabulary::Goal;

/// Daily macronutrient targets in grams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    /// Protein (g/day)
    pub protein_g: f64,
    /// Carbohydrates (g/day)
    pub carbs_g: f64,
    /// Fats (g/day)
    pub fats_g: f64,
}

impl MacroTargets {
    /// Energy the targets represent, given per-gram densities (kcal)
    #[must_use]
    pub fn total_kcal(&self, protein_density: f64, carbs_density: f64, fats_density: f64) -> f64 {
        self.fats_g.mul_add(
            fats_density,
            self.protein_g
                .mul_add(protein_density, self.carbs_g * carbs_density),
        )
    }
}

/// Numbers computed once per profile and never changed afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    bmr_kcal_per_day: f64,
    calorie_target_kcal: f64,
    goal: Goal,
    macro_targets: MacroTargets,
}

impl HealthMetrics {
    /// Assemble metrics from already computed parts
    #[must_use]
    pub const fn new(
        bmr_kcal_per_day: f64,
        calorie_target_kcal: f64,
        goal: Goal,
        macro_targets: MacroTargets,
    ) -> Self {
        Self {
            bmr_kcal_per_day,
            calorie_target_kcal,
            goal,
            macro_targets,
        }
    }

    /// Basal metabolic rate (kcal/day)
    #[must_use]
    pub const fn bmr_kcal_per_day(&self) -> f64 {
        self.bmr_kcal_per_day
    }

    /// Calorie target the macro split was derived from (kcal/day)
    #[must_use]
    pub const fn calorie_target_kcal(&self) -> f64 {
        self.calorie_target_kcal
    }

    /// Goal the macro split was derived for
    #[must_use]
    pub const fn goal(&self) -> Goal {
        self.goal
    }

    /// Macronutrient targets
    #[must_use]
    pub const fn macro_targets(&self) -> MacroTargets {
        self.macro_targets
    }
}
