//! Domain layer: Core screening types and logic.
//!
//! Pure computations with no I/O. Every function here is deterministic and
//! operates on validated inputs.

mod advice;
mod metrics;
mod patient;
mod reference;
mod risk;

pub use advice::{advice_for, Advice, DISCLAIMER};
pub use metrics::{
    bmi, bone_age, growth_velocity, percentile_band, BoneAgeAssessment, BoneAgeSource,
    CeilingBand, GrowthVelocity, MetricsBundle, PercentileBand, VelocityCeilings,
};
pub use patient::{
    decimal_age, EvaluationRequest, Gender, PatientObservation, PriorMeasurement,
    SuppliedBoneAge, MAX_AGE_YEARS, MAX_BONE_AGE_YEARS, MIN_AGE_YEARS,
};
pub use reference::{
    Measurement, Percentile, PercentileCurves, ReferenceCurve, ReferenceData, ReferenceError,
    ReferenceTable, ReferenceValues, SeriesData,
};
pub use risk::{classify, Classification, ClassificationInput, RiskFactors, RiskTier};
