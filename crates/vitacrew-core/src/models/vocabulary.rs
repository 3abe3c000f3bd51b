// ABOUTME: Fixed vocabularies for enumerated and categorical profile fields
// ABOUTME: Gender, skin type, stress and activity levels, fitness objectives, diets and skin concerns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! Every categorical value a profile may hold comes from one of the closed
//! vocabularies below. Parsing is case-insensitive and trims surrounding
//! whitespace; serialization always emits the canonical lower-case value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A value that is not part of the expected vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind} (allowed: {allowed})")]
pub struct UnknownValue {
    /// Vocabulary name, e.g. "skin type"
    pub kind: &'static str,
    /// The rejected input, as given
    pub value: String,
    /// Comma separated canonical values
    pub allowed: String,
}

macro_rules! vocabulary_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $value:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $value $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            /// Every member of the vocabulary in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Human-readable vocabulary name used in error messages
            pub const KIND: &'static str = $kind;

            /// Canonical lower-case value
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            /// Canonical values joined with `", "`
            #[must_use]
            pub fn allowed_values() -> String {
                Self::ALL
                    .iter()
                    .map(Self::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase();
                match normalized.as_str() {
                    $($value $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(UnknownValue {
                        kind: Self::KIND,
                        value: s.to_owned(),
                        allowed: Self::allowed_values(),
                    }),
                }
            }
        }
    };
}

vocabulary_enum! {
    /// Gender used for BMR coefficient selection
    Gender ("gender") {
        /// Male coefficients
        Male => "male",
        /// Female coefficients
        Female => "female",
        /// Uses the female coefficients for BMR
        Other => "other",
    }
}

vocabulary_enum! {
    /// Skin type for skincare assessment
    SkinType ("skin type") {
        /// Balanced skin
        Normal => "normal",
        /// Dry skin
        Dry => "dry",
        /// Oily skin
        Oily => "oily",
        /// Mixed dry and oily zones
        Combination => "combination",
        /// Easily irritated skin
        Sensitive => "sensitive",
    }
}

vocabulary_enum! {
    /// Self-reported stress level
    StressLevel ("stress level") {
        /// Low stress
        Low => "low",
        /// Moderate stress
        Moderate => "moderate",
        /// High stress
        High => "high",
    }
}

vocabulary_enum! {
    /// Habitual physical activity level
    ActivityLevel ("activity level") {
        /// Little or no exercise
        Sedentary => "sedentary",
        /// Exercise 1-3 days/week
        Light => "light",
        /// Exercise 3-5 days/week
        Moderate => "moderate",
        /// Exercise 6-7 days/week
        Active => "active",
        /// Hard training, physical job or twice-daily sessions
        VeryActive => "very_active" | "very active" | "very-active",
    }
}

vocabulary_enum! {
    /// Fitness objective a user may pursue
    FitnessObjective ("fitness objective") {
        /// Reduce body weight
        WeightLoss => "weight loss" | "weight_loss",
        /// Build muscle mass
        MuscleGain => "muscle gain" | "muscle_gain",
        /// Improve aerobic endurance
        Endurance => "endurance",
        /// Improve mobility and flexibility
        Flexibility => "flexibility",
        /// Increase strength
        Strength => "strength",
        /// Overall fitness
        GeneralFitness => "general fitness" | "general_fitness",
        /// Sport-specific performance
        AthleticPerformance => "athletic performance" | "athletic_performance",
    }
}

vocabulary_enum! {
    /// Dietary requirement or restriction
    DietaryRequirement ("dietary requirement") {
        /// No meat or fish
        Vegetarian => "vegetarian",
        /// No animal products
        Vegan => "vegan",
        /// No gluten
        GlutenFree => "gluten-free" | "gluten free" | "gluten_free",
        /// No dairy
        DairyFree => "dairy-free" | "dairy free" | "dairy_free",
        /// Ketogenic
        Keto => "keto",
        /// Paleolithic
        Paleo => "paleo",
        /// Halal
        Halal => "halal",
        /// Kosher
        Kosher => "kosher",
        /// Explicitly no requirement
        None => "none",
    }
}

vocabulary_enum! {
    /// Skin concern to address in the skincare routine
    SkinConcern ("skin concern") {
        /// Breakouts
        Acne => "acne",
        /// Fine lines and loss of elasticity
        Aging => "aging",
        /// Hyperpigmentation
        DarkSpots => "dark spots" | "dark_spots",
        /// Dryness
        Dryness => "dryness",
        /// Excess sebum
        Oiliness => "oiliness",
        /// Redness
        Redness => "redness",
        /// Sensitivity
        Sensitivity => "sensitivity",
        /// Uneven texture
        UnevenTexture => "uneven texture" | "uneven_texture",
        /// Explicitly no concern
        None => "none",
    }
}

vocabulary_enum! {
    /// Nutrition goal selecting the macronutrient split
    Goal ("nutrition goal") {
        /// Hold current body weight
        Maintenance => "maintenance",
        /// Caloric surplus for muscle gain
        Bulking => "bulking",
        /// Caloric deficit for fat loss
        Cutting => "cutting",
    }
}

impl Goal {
    /// Parse a free-form goal label, falling back to [`Goal::Maintenance`]
    /// for anything unrecognised.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(Self::Maintenance)
    }

    /// Goal implied by the user's objectives: the first objective that is
    /// weight loss or muscle gain decides, otherwise maintenance.
    #[must_use]
    pub fn from_objectives(objectives: &[FitnessObjective]) -> Self {
        objectives
            .iter()
            .find_map(|objective| match objective {
                FitnessObjective::WeightLoss => Some(Self::Cutting),
                FitnessObjective::MuscleGain => Some(Self::Bulking),
                _ => None,
            })
            .unwrap_or(Self::Maintenance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive_and_trimmed() {
        assert_eq!("  MALE ".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("Dry".parse::<SkinType>(), Ok(SkinType::Dry));
        assert_eq!(
            "Weight Loss".parse::<FitnessObjective>(),
            Ok(FitnessObjective::WeightLoss)
        );
    }

    #[test]
    fn test_activity_level_spellings() {
        for raw in ["very_active", "very active", "Very-Active"] {
            assert_eq!(raw.parse::<ActivityLevel>(), Ok(ActivityLevel::VeryActive));
        }
    }

    #[test]
    fn test_unknown_value_lists_allowed() {
        let err = "carnivore".parse::<DietaryRequirement>().unwrap_err();
        assert_eq!(err.kind, "dietary requirement");
        assert!(err.allowed.contains("gluten-free"));
        assert!(err.to_string().contains("'carnivore'"));
    }

    #[test]
    fn test_goal_fallbacks() {
        assert_eq!(Goal::from_label("CUTTING"), Goal::Cutting);
        assert_eq!(Goal::from_label("shred"), Goal::Maintenance);
        assert_eq!(
            Goal::from_objectives(&[FitnessObjective::Endurance, FitnessObjective::MuscleGain]),
            Goal::Bulking
        );
        assert_eq!(
            Goal::from_objectives(&[FitnessObjective::Flexibility]),
            Goal::Maintenance
        );
    }

    #[test]
    fn test_serializes_canonical_value() {
        let json = serde_json::to_string(&SkinConcern::DarkSpots).unwrap();
        assert_eq!(json, "\"dark spots\"");
        let back: ActivityLevel = serde_json::from_str("\"very active\"").unwrap();
        assert_eq!(back, ActivityLevel::VeryActive);
    }
}
