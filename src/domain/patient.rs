//! Patient input types for early puberty screening.
//!
//! [`EvaluationRequest`] is the raw, deserializable input supplied by a caller.
//! [`PatientObservation`] is the validated form that the metrics and risk
//! code operate on; it can only be obtained through validation.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lowest and highest age (years) covered by the reference curves.
pub const MIN_AGE_YEARS: f64 = 2.0;
pub const MAX_AGE_YEARS: f64 = 19.0;

/// Upper bound accepted for a supplied bone age (years).
pub const MAX_BONE_AGE_YEARS: f64 = 25.0;

/// Sex of the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Age (years) below which puberty signs count as early.
    #[must_use]
    pub fn early_puberty_threshold(&self) -> f64 {
        match self {
            Self::Female => 8.0,
            Self::Male => 9.0,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Female => write!(f, "Female"),
            Self::Male => write!(f, "Male"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "f" => Ok(Self::Female),
            "male" | "m" => Ok(Self::Male),
            other => Err(format!("Unknown gender '{other}' (expected Female or Male)")),
        }
    }
}

/// An earlier measurement of the same child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorMeasurement {
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Time between the prior and the current measurement.
    pub months_elapsed: f64,
}

/// Raw evaluation input as received from a caller.
///
/// `gender` is kept as text so that unknown values are reported as invalid
/// input rather than as a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Decimal age in years
    pub age: f64,
    pub gender: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Number of observed secondary sexual characteristics
    ///
    /// Signed so that a negative count is reported as invalid input rather
    /// than as a deserialization failure.
    #[serde(default)]
    pub secondary_signs_count: i64,
    /// Whether `bone_age` comes from a manual or radiological reading
    #[serde(default)]
    pub bone_age_known: bool,
    /// Bone age (years) supplied by a reader or an external estimator
    #[serde(default)]
    pub bone_age: Option<f64>,
    #[serde(default)]
    pub family_history: bool,
    #[serde(default)]
    pub prior_measurement: Option<PriorMeasurement>,
}

/// Where a supplied bone age came from, with its value in years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuppliedBoneAge {
    /// Read manually from a radiograph
    Manual(f64),
    /// Produced by an external, best-effort estimator
    External(f64),
}

impl SuppliedBoneAge {
    #[must_use]
    pub fn years(&self) -> f64 {
        match self {
            Self::Manual(years) | Self::External(years) => *years,
        }
    }
}

/// Validated observation of one child at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientObservation {
    pub age: f64,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub secondary_signs: u32,
    pub bone_age: Option<SuppliedBoneAge>,
    pub family_history: bool,
    pub prior_measurement: Option<PriorMeasurement>,
}

impl PatientObservation {
    /// Validate a request.
    ///
    /// # Errors
    /// Returns every violated rule, one message per violation.
    pub fn from_request(request: &EvaluationRequest) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&request.age) {
            errors.push(format!(
                "Age {} out of range [{MIN_AGE_YEARS}, {MAX_AGE_YEARS}]",
                request.age
            ));
        }

        let gender = match request.gender.parse::<Gender>() {
            Ok(g) => Some(g),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        check_positive(&mut errors, "Height", request.height_cm);
        check_positive(&mut errors, "Weight", request.weight_kg);

        let secondary_signs = match u32::try_from(request.secondary_signs_count) {
            Ok(count) => Some(count),
            Err(_) => {
                errors.push(format!(
                    "Secondary signs count {} must be a non-negative whole number",
                    request.secondary_signs_count
                ));
                None
            }
        };

        let bone_age = match (request.bone_age, request.bone_age_known) {
            (Some(years), known) => {
                if years.is_finite() && years > 0.0 && years <= MAX_BONE_AGE_YEARS {
                    Some(if known {
                        SuppliedBoneAge::Manual(years)
                    } else {
                        SuppliedBoneAge::External(years)
                    })
                } else {
                    errors.push(format!(
                        "Bone age {years} out of range (0, {MAX_BONE_AGE_YEARS}]"
                    ));
                    None
                }
            }
            // No reading: the heuristic estimate applies whatever the flag says.
            (None, _) => None,
        };

        if let Some(prior) = &request.prior_measurement {
            check_positive(&mut errors, "Prior height", prior.height_cm);
            check_positive(&mut errors, "Prior weight", prior.weight_kg);
            check_positive(&mut errors, "Months elapsed", prior.months_elapsed);
        }

        match (gender, secondary_signs) {
            (Some(gender), Some(secondary_signs)) if errors.is_empty() => Ok(Self {
                age: request.age,
                gender,
                height_cm: request.height_cm,
                weight_kg: request.weight_kg,
                secondary_signs,
                bone_age,
                family_history: request.family_history,
                prior_measurement: request.prior_measurement,
            }),
            _ => Err(errors),
        }
    }
}

fn check_positive(errors: &mut Vec<String>, label: &str, value: f64) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(format!("{label} {value} must be a positive number"));
    }
}

/// Decimal age in years between `birth` and `on`.
///
/// Whole years are counted on calendar anniversaries; the remainder is the
/// fraction of the current year of life that has elapsed. Returns `None` if
/// `on` is before `birth`.
#[must_use]
pub fn decimal_age(birth: NaiveDate, on: NaiveDate) -> Option<f64> {
    if on < birth {
        return None;
    }

    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }

    let last = anniversary(birth, years)?;
    let next = anniversary(birth, years + 1)?;
    let elapsed = (on - last).num_days() as f64;
    let span = (next - last).num_days() as f64;

    Some(f64::from(years) + elapsed / span)
}

/// Birthday in year `birth.year() + years`; Feb 29 falls back to Feb 28.
fn anniversary(birth: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = birth.year() + years;
    NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, birth.month(), birth.day() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EvaluationRequest {
        EvaluationRequest {
            age: 7.0,
            gender: "Female".to_string(),
            height_cm: 118.0,
            weight_kg: 22.0,
            secondary_signs_count: 3,
            bone_age_known: true,
            bone_age: Some(9.5),
            family_history: false,
            prior_measurement: None,
        }
    }

    #[test]
    fn test_valid_request() {
        let obs = PatientObservation::from_request(&request()).expect("Should validate");
        assert_eq!(obs.gender, Gender::Female);
        assert_eq!(obs.secondary_signs, 3);
        match obs.bone_age {
            Some(SuppliedBoneAge::Manual(y)) => assert!((y - 9.5).abs() < f64::EPSILON),
            other => panic!("unexpected bone age {other:?}"),
        }
    }

    #[test]
    fn test_unflagged_bone_age_is_external() {
        let mut req = request();
        req.bone_age_known = false;
        let obs = PatientObservation::from_request(&req).expect("Should validate");
        assert!(matches!(obs.bone_age, Some(SuppliedBoneAge::External(_))));
    }

    #[test]
    fn test_collects_all_errors() {
        let req = EvaluationRequest {
            age: 1.5,
            gender: "other".to_string(),
            height_cm: 0.0,
            weight_kg: -3.0,
            ..request()
        };
        let errors = PatientObservation::from_request(&req).expect_err("Should fail");
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("Age"));
        assert!(errors[1].contains("Unknown gender"));
    }

    #[test]
    fn test_age_bounds_inclusive() {
        for age in [2.0, 19.0] {
            let req = EvaluationRequest { age, ..request() };
            assert!(PatientObservation::from_request(&req).is_ok());
        }
        let req = EvaluationRequest { age: 19.01, ..request() };
        assert!(PatientObservation::from_request(&req).is_err());
        let req = EvaluationRequest { age: f64::NAN, ..request() };
        assert!(PatientObservation::from_request(&req).is_err());
    }

    #[test]
    fn test_known_flag_without_value_falls_back() {
        let req = EvaluationRequest {
            bone_age: None,
            ..request()
        };
        let obs = PatientObservation::from_request(&req).expect("Should validate");
        assert!(obs.bone_age.is_none());

        let req = EvaluationRequest {
            bone_age: None,
            bone_age_known: false,
            ..request()
        };
        let obs = PatientObservation::from_request(&req).expect("Should validate");
        assert!(obs.bone_age.is_none());
    }

    #[test]
    fn test_supplied_bone_age_years() {
        assert_eq!(SuppliedBoneAge::Manual(9.5).years(), 9.5);
        assert_eq!(SuppliedBoneAge::External(8.25).years(), 8.25);
    }

    #[test]
    fn test_negative_signs_count_rejected() {
        let req = EvaluationRequest {
            secondary_signs_count: -1,
            ..request()
        };
        let errors = PatientObservation::from_request(&req).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Secondary signs count -1"));

        let req = EvaluationRequest {
            secondary_signs_count: i64::from(u32::MAX) + 1,
            ..request()
        };
        assert!(PatientObservation::from_request(&req).is_err());
    }

    #[test]
    fn test_prior_measurement_validation() {
        let req = EvaluationRequest {
            prior_measurement: Some(PriorMeasurement {
                height_cm: 115.0,
                weight_kg: 20.0,
                months_elapsed: 0.0,
            }),
            ..request()
        };
        let errors = PatientObservation::from_request(&req).expect_err("Should fail");
        assert_eq!(errors, vec!["Months elapsed 0 must be a positive number".to_string()]);
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("f".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!(" MALE ".parse::<Gender>(), Ok(Gender::Male));
        assert!("x".parse::<Gender>().is_err());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: EvaluationRequest = serde_json::from_str(
            r#"{"age": 10.0, "gender": "Male", "height_cm": 140.0, "weight_kg": 35.0}"#,
        )
        .expect("Should parse");
        assert_eq!(req.secondary_signs_count, 0);
        assert!(!req.bone_age_known);
        assert!(req.prior_measurement.is_none());
    }

    #[test]
    fn test_decimal_age() {
        let birth = NaiveDate::from_ymd_opt(2016, 3, 1).expect("date");
        let on = NaiveDate::from_ymd_opt(2023, 3, 1).expect("date");
        assert_eq!(decimal_age(birth, on), Some(7.0));

        let half = NaiveDate::from_ymd_opt(2023, 8, 31).expect("date");
        let age = decimal_age(birth, half).expect("age");
        assert!(age > 7.49 && age < 7.51);

        let before = NaiveDate::from_ymd_opt(2015, 1, 1).expect("date");
        assert_eq!(decimal_age(birth, before), None);
    }

    #[test]
    fn test_decimal_age_leap_day_birth() {
        let birth = NaiveDate::from_ymd_opt(2016, 2, 29).expect("date");
        let on = NaiveDate::from_ymd_opt(2017, 2, 28).expect("date");
        assert_eq!(decimal_age(birth, on), Some(1.0));
    }
}
