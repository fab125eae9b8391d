//! Derived growth metrics.
//!
//! BMI, percentile bands against the reference curves, bone-age delta and,
//! when an earlier measurement exists, growth velocity.
//!
//! The bone-age estimate used when no reading is supplied and the velocity
//! ceilings are informal screening heuristics, not validated clinical
//! thresholds.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::patient::{Gender, PatientObservation, PriorMeasurement, SuppliedBoneAge};
use super::reference::{PercentileCurves, ReferenceTable, ReferenceValues};

/// Minimum number of secondary signs that advances the heuristic bone age.
const HEURISTIC_SIGNS_THRESHOLD: u32 = 2;

/// Years added to chronological age by the heuristic bone-age estimate.
const HEURISTIC_ADVANCE_YEARS: f64 = 0.5;

/// Position of a measurement relative to the P3/P50/P97 curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PercentileBand {
    BelowP3,
    #[serde(rename = "P3toP50")]
    P3ToP50,
    #[serde(rename = "P50toP97")]
    P50ToP97,
    AboveP97,
}

impl PercentileBand {
    /// Classify `value` against reference values; each boundary is exclusive
    /// on the upper side.
    #[must_use]
    pub fn classify(value: f64, reference: &ReferenceValues) -> Self {
        if value < reference.p3 {
            Self::BelowP3
        } else if value < reference.p50 {
            Self::P3ToP50
        } else if value < reference.p97 {
            Self::P50ToP97
        } else {
            Self::AboveP97
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::BelowP3 => "below P3",
            Self::P3ToP50 => "P3-P50",
            Self::P50ToP97 => "P50-P97",
            Self::AboveP97 => "above P97",
        }
    }
}

impl fmt::Display for PercentileBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Body mass index (kg/m²). `height_cm` must be positive.
#[must_use]
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Band of `value` against `curves` interpolated at `age`.
#[must_use]
pub fn percentile_band(age: f64, value: f64, curves: &PercentileCurves) -> PercentileBand {
    PercentileBand::classify(value, &curves.at(age))
}

/// Origin of the bone age used for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoneAgeSource {
    /// Manual or radiological reading
    Manual,
    /// External best-effort estimator
    External,
    /// Derived from age and secondary signs
    Heuristic,
}

impl BoneAgeSource {
    /// Only a manual reading is a clinical-grade bone age.
    #[must_use]
    pub fn is_clinical(&self) -> bool {
        matches!(self, Self::Manual)
    }
}

impl fmt::Display for BoneAgeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual reading"),
            Self::External => write!(f, "external estimate"),
            Self::Heuristic => write!(f, "heuristic estimate"),
        }
    }
}

/// Bone age used for classification and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneAgeAssessment {
    pub years: f64,
    pub source: BoneAgeSource,
}

/// Pick the supplied bone age, or estimate one from age and signs.
#[must_use]
pub fn bone_age(
    age: f64,
    supplied: Option<SuppliedBoneAge>,
    secondary_signs: u32,
) -> BoneAgeAssessment {
    match supplied {
        Some(reading) => BoneAgeAssessment {
            years: reading.years(),
            source: match reading {
                SuppliedBoneAge::Manual(_) => BoneAgeSource::Manual,
                SuppliedBoneAge::External(_) => BoneAgeSource::External,
            },
        },
        None => {
            let years = if secondary_signs >= HEURISTIC_SIGNS_THRESHOLD {
                age + HEURISTIC_ADVANCE_YEARS
            } else {
                age
            };
            BoneAgeAssessment {
                years,
                source: BoneAgeSource::Heuristic,
            }
        }
    }
}

/// Change between a prior and the current measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthVelocity {
    /// cm per year
    pub height_per_year: f64,
    /// kg per year
    pub weight_per_year: f64,
    pub height_delta: f64,
    pub weight_delta: f64,
    pub months_elapsed: f64,
}

/// Annualised growth between `prior` and the current measurement.
/// `prior.months_elapsed` must be positive.
#[must_use]
pub fn growth_velocity(height_cm: f64, weight_kg: f64, prior: &PriorMeasurement) -> GrowthVelocity {
    let years = prior.months_elapsed / 12.0;
    let height_delta = height_cm - prior.height_cm;
    let weight_delta = weight_kg - prior.weight_kg;

    GrowthVelocity {
        height_per_year: height_delta / years,
        weight_per_year: weight_delta / years,
        height_delta,
        weight_delta,
        months_elapsed: prior.months_elapsed,
    }
}

/// Normal height-velocity ceiling for one sex, split at an age threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CeilingBand {
    pub threshold_age: f64,
    /// cm/year below `threshold_age`
    pub below: f64,
    /// cm/year at or above `threshold_age`
    pub at_or_above: f64,
}

impl CeilingBand {
    #[must_use]
    pub fn ceiling(&self, age: f64) -> f64 {
        if age < self.threshold_age {
            self.below
        } else {
            self.at_or_above
        }
    }
}

/// Height-velocity ceilings above which growth counts as accelerated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityCeilings {
    pub female: CeilingBand,
    pub male: CeilingBand,
}

impl Default for VelocityCeilings {
    fn default() -> Self {
        Self {
            female: CeilingBand {
                threshold_age: 8.0,
                below: 7.0,
                at_or_above: 10.0,
            },
            male: CeilingBand {
                threshold_age: 10.0,
                below: 7.0,
                at_or_above: 12.0,
            },
        }
    }
}

impl VelocityCeilings {
    #[must_use]
    pub fn ceiling(&self, age: f64, gender: Gender) -> f64 {
        match gender {
            Gender::Female => self.female.ceiling(age),
            Gender::Male => self.male.ceiling(age),
        }
    }

    /// True when `height_velocity` (cm/year) is strictly above the ceiling.
    #[must_use]
    pub fn is_accelerated(&self, age: f64, gender: Gender, height_velocity: f64) -> bool {
        height_velocity > self.ceiling(age, gender)
    }
}

/// Every metric derived from one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    pub bmi: f64,
    pub height_band: PercentileBand,
    pub weight_band: PercentileBand,
    /// Reference values at the child's age
    pub height_reference: ReferenceValues,
    pub weight_reference: ReferenceValues,
    pub bone_age: BoneAgeAssessment,
    /// Bone age minus chronological age
    pub bone_age_diff: f64,
    pub velocity: Option<GrowthVelocity>,
    pub velocity_accelerated: Option<bool>,
}

impl MetricsBundle {
    #[must_use]
    pub fn compute(
        observation: &PatientObservation,
        table: &ReferenceTable,
        ceilings: &VelocityCeilings,
    ) -> Self {
        let age = observation.age;

        let height_reference = table.height().at(age);
        let weight_reference = table.weight().at(age);

        let bone_age = bone_age(age, observation.bone_age, observation.secondary_signs);

        let velocity = observation
            .prior_measurement
            .as_ref()
            .map(|prior| growth_velocity(observation.height_cm, observation.weight_kg, prior));
        let velocity_accelerated = velocity
            .map(|v| ceilings.is_accelerated(age, observation.gender, v.height_per_year));

        Self {
            bmi: bmi(observation.weight_kg, observation.height_cm),
            height_band: PercentileBand::classify(observation.height_cm, &height_reference),
            weight_band: PercentileBand::classify(observation.weight_kg, &weight_reference),
            height_reference,
            weight_reference,
            bone_age_diff: bone_age.years - age,
            bone_age,
            velocity,
            velocity_accelerated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn observation() -> PatientObservation {
        PatientObservation {
            age: 9.5,
            gender: Gender::Male,
            height_cm: 140.0,
            weight_kg: 35.0,
            secondary_signs: 1,
            bone_age: Some(SuppliedBoneAge::Manual(10.0)),
            family_history: false,
            prior_measurement: None,
        }
    }

    #[test]
    fn test_bmi() {
        let value = bmi(35.0, 130.0);
        assert!((value - 20.710_059).abs() < 1e-5);
        assert_eq!(format!("{value:.2}"), "20.71");
    }

    #[test]
    fn test_band_boundaries_are_exclusive_above() {
        let reference = ReferenceValues {
            p3: 131.0,
            p50: 138.0,
            p97: 150.0,
        };
        assert_eq!(PercentileBand::classify(130.9, &reference), PercentileBand::BelowP3);
        assert_eq!(PercentileBand::classify(131.0, &reference), PercentileBand::P3ToP50);
        assert_eq!(PercentileBand::classify(138.0, &reference), PercentileBand::P50ToP97);
        assert_eq!(PercentileBand::classify(150.0, &reference), PercentileBand::AboveP97);
    }

    #[test]
    fn test_band_against_standard_table() {
        let height = ReferenceTable::standard().height();
        // P50 at 11 is 138: equal to P50 is the upper band.
        assert_eq!(percentile_band(11.0, 138.0, height), PercentileBand::P50ToP97);
        // P97 at 10 is 138.
        assert_eq!(percentile_band(10.0, 138.0, height), PercentileBand::AboveP97);
        assert_eq!(percentile_band(10.0, 133.0, height), PercentileBand::P50ToP97);
        assert_eq!(percentile_band(10.0, 130.0, height), PercentileBand::P3ToP50);
    }

    #[test]
    fn test_bone_age_sources() {
        let manual = bone_age(7.0, Some(SuppliedBoneAge::Manual(9.5)), 0);
        assert_eq!(manual.source, BoneAgeSource::Manual);
        assert!((manual.years - 9.5).abs() < f64::EPSILON);
        assert!(manual.source.is_clinical());

        let external = bone_age(7.0, Some(SuppliedBoneAge::External(8.0)), 3);
        assert_eq!(external.source, BoneAgeSource::External);
        assert!(!external.source.is_clinical());

        let advanced = bone_age(7.0, None, 2);
        assert_eq!(advanced.source, BoneAgeSource::Heuristic);
        assert!((advanced.years - 7.5).abs() < f64::EPSILON);

        let unchanged = bone_age(7.0, None, 1);
        assert!((unchanged.years - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_growth_velocity() {
        let prior = PriorMeasurement {
            height_cm: 134.0,
            weight_kg: 32.0,
            months_elapsed: 6.0,
        };
        let v = growth_velocity(140.0, 35.0, &prior);
        assert!((v.height_delta - 6.0).abs() < 1e-9);
        assert!((v.height_per_year - 12.0).abs() < 1e-9);
        assert!((v.weight_per_year - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_velocity_ceilings() {
        let ceilings = VelocityCeilings::default();
        assert!(!ceilings.is_accelerated(7.9, Gender::Female, 7.0));
        assert!(ceilings.is_accelerated(7.9, Gender::Female, 7.1));
        assert!(!ceilings.is_accelerated(8.0, Gender::Female, 10.0));
        assert!(ceilings.is_accelerated(8.0, Gender::Female, 10.5));
        assert!(ceilings.is_accelerated(9.5, Gender::Male, 8.0));
        assert!(!ceilings.is_accelerated(10.0, Gender::Male, 12.0));
        assert!(ceilings.is_accelerated(10.0, Gender::Male, 12.01));
    }

    #[test]
    fn test_bundle_without_prior_has_no_velocity() {
        let bundle = MetricsBundle::compute(
            &observation(),
            ReferenceTable::standard(),
            &VelocityCeilings::default(),
        );
        assert!(bundle.velocity.is_none());
        assert!(bundle.velocity_accelerated.is_none());
        assert!((bundle.bone_age_diff - 0.5).abs() < 1e-9);
        // P97 height at 9.5 is 136.
        assert_eq!(bundle.height_band, PercentileBand::AboveP97);
    }

    #[test]
    fn test_bundle_with_prior_flags_acceleration() {
        let mut obs = observation();
        obs.prior_measurement = Some(PriorMeasurement {
            height_cm: 135.0,
            weight_kg: 33.0,
            months_elapsed: 6.0,
        });
        let bundle =
            MetricsBundle::compute(&obs, ReferenceTable::standard(), &VelocityCeilings::default());
        let velocity = bundle.velocity.expect("velocity");
        assert!((velocity.height_per_year - 10.0).abs() < 1e-9);
        assert_eq!(bundle.velocity_accelerated, Some(true));
    }

    proptest! {
        #[test]
        fn bands_partition_value_space(age in 2.0f64..19.0, value in 50.0f64..200.0) {
            let reference = ReferenceTable::standard().height().at(age);
            let band = PercentileBand::classify(value, &reference);
            let expected = [
                value < reference.p3,
                reference.p3 <= value && value < reference.p50,
                reference.p50 <= value && value < reference.p97,
                reference.p97 <= value,
            ];
            prop_assert_eq!(expected.iter().filter(|b| **b).count(), 1);
            let index = match band {
                PercentileBand::BelowP3 => 0,
                PercentileBand::P3ToP50 => 1,
                PercentileBand::P50ToP97 => 2,
                PercentileBand::AboveP97 => 3,
            };
            prop_assert!(expected[index]);
        }

        #[test]
        fn bands_are_monotone_in_value(age in 2.0f64..19.0, a in 5.0f64..100.0, b in 5.0f64..100.0) {
            let weight = ReferenceTable::standard().weight();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(percentile_band(age, lo, weight) <= percentile_band(age, hi, weight));
        }
    }
}
