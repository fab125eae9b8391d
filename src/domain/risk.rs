//! Risk tier classification for early puberty.
//!
//! A fixed decision table over age, sex, secondary signs and bone-age
//! advancement, with an optional upgrade for accelerated growth.

use serde::{Deserialize, Serialize};

use super::patient::Gender;

/// Secondary signs at or above this count are significant.
const SIGNIFICANT_SIGNS: u32 = 2;

/// Bone-age advancement (years) at or above this value is advanced.
const ADVANCED_BONE_AGE_YEARS: f64 = 2.0;

/// Risk tier for precocious puberty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    /// No combination of indicators
    Low,
    /// Some indicators, follow-up recommended
    Medium,
    /// All indicators present, specialist referral advised
    High,
}

impl RiskTier {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - Growth within expected pattern",
            Self::Medium => "Medium risk - Follow-up recommended",
            Self::High => "High risk - Specialist consultation advised",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),     // Emerald (#10B981)
            Self::Medium => (251, 191, 36),  // Amber (#FBBF24)
            Self::High => (244, 63, 94),     // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Inputs to the decision table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationInput {
    pub age: f64,
    pub gender: Gender,
    pub secondary_signs: u32,
    pub bone_age_diff: f64,
    /// `None` when no prior measurement was available
    pub velocity_accelerated: Option<bool>,
}

/// Individual rule outcomes behind a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    /// Age below the sex-specific threshold
    pub early: bool,
    /// Enough secondary signs
    pub significant_signs: bool,
    /// Bone age advanced by two years or more
    pub advanced_bone_age: bool,
    /// Tier was raised from Low because of accelerated growth
    pub velocity_upgrade: bool,
}

/// Tier together with the factors that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: RiskTier,
    pub factors: RiskFactors,
}

/// Apply the decision table.
///
/// Total over all inputs: every combination yields exactly one tier.
#[must_use]
pub fn classify(input: &ClassificationInput) -> Classification {
    let early = input.age < input.gender.early_puberty_threshold();
    let significant = input.secondary_signs >= SIGNIFICANT_SIGNS;
    let advanced = input.bone_age_diff >= ADVANCED_BONE_AGE_YEARS;

    let base = if early && significant && advanced {
        RiskTier::High
    } else if (early && (significant || advanced)) || (significant && advanced) {
        RiskTier::Medium
    } else {
        RiskTier::Low
    };

    let velocity_upgrade = base == RiskTier::Low && input.velocity_accelerated == Some(true);
    let tier = if velocity_upgrade {
        RiskTier::Medium
    } else {
        base
    };

    Classification {
        tier,
        factors: RiskFactors {
            early,
            significant_signs: significant,
            advanced_bone_age: advanced,
            velocity_upgrade,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(age: f64, gender: Gender, signs: u32, diff: f64) -> ClassificationInput {
        ClassificationInput {
            age,
            gender,
            secondary_signs: signs,
            bone_age_diff: diff,
            velocity_accelerated: None,
        }
    }

    #[test]
    fn test_all_indicators_is_high() {
        let result = classify(&input(7.0, Gender::Female, 3, 2.5));
        assert_eq!(result.tier, RiskTier::High);
        assert!(result.factors.early);
        assert!(result.factors.significant_signs);
        assert!(result.factors.advanced_bone_age);
        assert!(!result.factors.velocity_upgrade);
    }

    #[test]
    fn test_not_early_with_one_sign_is_low_then_upgraded() {
        let base = input(9.5, Gender::Male, 1, 0.5);
        assert_eq!(classify(&base).tier, RiskTier::Low);

        let accelerated = ClassificationInput {
            velocity_accelerated: Some(true),
            ..base
        };
        let result = classify(&accelerated);
        assert_eq!(result.tier, RiskTier::Medium);
        assert!(result.factors.velocity_upgrade);

        let normal = ClassificationInput {
            velocity_accelerated: Some(false),
            ..base
        };
        assert_eq!(classify(&normal).tier, RiskTier::Low);
    }

    #[test]
    fn test_medium_combinations() {
        // early + signs
        assert_eq!(classify(&input(6.0, Gender::Female, 2, 0.0)).tier, RiskTier::Medium);
        // early + bone age
        assert_eq!(classify(&input(6.0, Gender::Female, 0, 2.0)).tier, RiskTier::Medium);
        // not early, signs + bone age
        assert_eq!(classify(&input(12.0, Gender::Male, 4, 3.0)).tier, RiskTier::Medium);
        // early alone is not enough
        assert_eq!(classify(&input(6.0, Gender::Male, 1, 1.0)).tier, RiskTier::Low);
    }

    #[test]
    fn test_velocity_never_changes_medium_or_high() {
        let mut medium = input(6.0, Gender::Female, 2, 0.0);
        medium.velocity_accelerated = Some(true);
        assert_eq!(classify(&medium).tier, RiskTier::Medium);
        assert!(!classify(&medium).factors.velocity_upgrade);

        let mut high = input(6.0, Gender::Female, 2, 2.0);
        high.velocity_accelerated = Some(true);
        assert_eq!(classify(&high).tier, RiskTier::High);
    }

    #[test]
    fn test_threshold_age_is_not_early() {
        assert!(!classify(&input(8.0, Gender::Female, 3, 3.0)).factors.early);
        assert!(classify(&input(7.99, Gender::Female, 3, 3.0)).factors.early);
        assert!(!classify(&input(9.0, Gender::Male, 3, 3.0)).factors.early);
        assert!(classify(&input(8.99, Gender::Male, 3, 3.0)).factors.early);
        // Male at 8.5 is early, Female at 8.5 is not.
        assert_eq!(classify(&input(8.5, Gender::Male, 2, 2.0)).tier, RiskTier::High);
        assert_eq!(classify(&input(8.5, Gender::Female, 2, 2.0)).tier, RiskTier::Medium);
    }

    #[test]
    fn test_inclusive_sign_and_bone_age_boundaries() {
        let at = classify(&input(10.0, Gender::Female, 2, 2.0));
        assert!(at.factors.significant_signs);
        assert!(at.factors.advanced_bone_age);

        let below = classify(&input(10.0, Gender::Female, 1, 1.999));
        assert!(!below.factors.significant_signs);
        assert!(!below.factors.advanced_bone_age);
    }

    #[test]
    fn test_total_and_deterministic() {
        for gender in [Gender::Female, Gender::Male] {
            for age in [2.0, 7.5, 8.0, 8.5, 9.0, 12.0, 19.0] {
                for signs in 0..5 {
                    for diff in [-1.0, 0.0, 1.99, 2.0, 4.0] {
                        for velocity in [None, Some(false), Some(true)] {
                            let case = ClassificationInput {
                                age,
                                gender,
                                secondary_signs: signs,
                                bone_age_diff: diff,
                                velocity_accelerated: velocity,
                            };
                            assert_eq!(classify(&case), classify(&case));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(RiskTier::Medium.to_string(), "MEDIUM");
        assert!(RiskTier::Low < RiskTier::High);
    }
}
