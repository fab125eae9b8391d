//! Screening service: Orchestrates one evaluation.
//!
//! This service coordinates:
//! - Input validation
//! - Metric derivation against the shared reference table
//! - Risk classification
//! - Advice lookup and caveat notes
//!
//! The service holds no per-evaluation state and can be shared across
//! threads; every call is a pure function of its input and the table.

use std::io::Read;
use std::sync::Arc;

use serde::Serialize;

use super::chart::GrowthChart;
use crate::domain::{
    advice_for, classify, Advice, BoneAgeSource, ClassificationInput, EvaluationRequest,
    MetricsBundle, PatientObservation, PercentileBand, ReferenceTable, ReferenceValues,
    RiskFactors, RiskTier, VelocityCeilings,
};
use crate::ports::ReferenceSource;
use crate::ScreeningError;

/// Growth velocity section of a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VelocityReport {
    /// cm per year
    pub height_per_year: f64,
    /// kg per year
    pub weight_per_year: f64,
    pub height_delta: f64,
    pub weight_delta: f64,
    pub months_elapsed: f64,
    /// Height velocity above the normal ceiling for age and sex
    pub accelerated: bool,
    /// The ceiling used (cm/year)
    pub ceiling: f64,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub bmi: f64,
    pub height_band: PercentileBand,
    pub weight_band: PercentileBand,
    pub height_reference: ReferenceValues,
    pub weight_reference: ReferenceValues,
    pub bone_age: f64,
    pub bone_age_source: BoneAgeSource,
    pub bone_age_diff: f64,
    pub velocity: Option<VelocityReport>,
    pub risk_tier: RiskTier,
    pub risk_factors: RiskFactors,
    pub advice: &'static Advice,
    pub notes: Vec<String>,
}

/// Service running the screening pipeline.
#[derive(Debug, Clone)]
pub struct ScreeningService {
    reference: Arc<ReferenceTable>,
    ceilings: VelocityCeilings,
}

impl Default for ScreeningService {
    fn default() -> Self {
        Self::new(ReferenceTable::shared())
    }
}

impl ScreeningService {
    /// Create a service over an already loaded table.
    #[must_use]
    pub fn new(reference: Arc<ReferenceTable>) -> Self {
        Self {
            reference,
            ceilings: VelocityCeilings::default(),
        }
    }

    /// Load the table from `source` and create a service over it.
    ///
    /// # Errors
    /// Returns error if the reference table cannot be loaded.
    pub fn from_source(source: &dyn ReferenceSource) -> Result<Self, ScreeningError> {
        tracing::info!("Loading reference curves: {}", source.describe());
        let table = source.load()?;
        tracing::info!("Reference table ready (fingerprint {})", &table.fingerprint()[..12]);
        Ok(Self::new(table))
    }

    /// Replace the growth-velocity ceilings.
    #[must_use]
    pub fn with_velocity_ceilings(mut self, ceilings: VelocityCeilings) -> Self {
        self.ceilings = ceilings;
        self
    }

    #[must_use]
    pub fn reference(&self) -> &ReferenceTable {
        &self.reference
    }

    #[must_use]
    pub fn velocity_ceilings(&self) -> &VelocityCeilings {
        &self.ceilings
    }

    /// Validate a request.
    ///
    /// # Errors
    /// Returns `ScreeningError::InvalidInput` listing every violated rule.
    pub fn validate(&self, request: &EvaluationRequest) -> Result<PatientObservation, ScreeningError> {
        PatientObservation::from_request(request).map_err(|errors| {
            tracing::warn!("Rejected evaluation request: {} validation error(s)", errors.len());
            ScreeningError::InvalidInput(errors.join("; "))
        })
    }

    /// Validate and evaluate a request.
    ///
    /// # Errors
    /// Returns `ScreeningError::InvalidInput` if validation fails.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResult, ScreeningError> {
        let observation = self.validate(request)?;
        Ok(self.evaluate_observation(&observation))
    }

    /// Read a JSON request from `reader`.
    ///
    /// # Errors
    /// Returns `ScreeningError::Io` if reading fails and
    /// `ScreeningError::Serialization` if the JSON is malformed.
    pub fn read_request<R: Read>(mut reader: R) -> crate::Result<EvaluationRequest> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Evaluate a JSON request and return the result as JSON.
    ///
    /// # Errors
    /// Returns `ScreeningError::Serialization` for malformed JSON and
    /// `ScreeningError::InvalidInput` if validation fails.
    pub fn evaluate_json(&self, json: &str) -> crate::Result<String> {
        let request: EvaluationRequest = serde_json::from_str(json)?;
        let result = self.evaluate(&request)?;
        Ok(serde_json::to_string(&result)?)
    }

    /// Evaluate an already validated observation.
    #[must_use]
    pub fn evaluate_observation(&self, observation: &PatientObservation) -> EvaluationResult {
        let metrics = MetricsBundle::compute(observation, &self.reference, &self.ceilings);
        tracing::debug!(
            "Metrics: height_band={}, weight_band={}, bone_age_source={}",
            metrics.height_band,
            metrics.weight_band,
            metrics.bone_age.source
        );

        let classification = classify(&ClassificationInput {
            age: observation.age,
            gender: observation.gender,
            secondary_signs: observation.secondary_signs,
            bone_age_diff: metrics.bone_age_diff,
            velocity_accelerated: metrics.velocity_accelerated,
        });

        let ceiling = self.ceilings.ceiling(observation.age, observation.gender);
        let velocity = metrics.velocity.map(|v| VelocityReport {
            height_per_year: v.height_per_year,
            weight_per_year: v.weight_per_year,
            height_delta: v.height_delta,
            weight_delta: v.weight_delta,
            months_elapsed: v.months_elapsed,
            accelerated: metrics.velocity_accelerated.unwrap_or(false),
            ceiling,
        });

        let notes = build_notes(observation, &metrics, &classification.factors, ceiling);

        tracing::info!(
            "Screening complete: tier={}, bone_age_source={}, velocity_assessed={}",
            classification.tier,
            metrics.bone_age.source,
            velocity.is_some()
        );

        EvaluationResult {
            bmi: metrics.bmi,
            height_band: metrics.height_band,
            weight_band: metrics.weight_band,
            height_reference: metrics.height_reference,
            weight_reference: metrics.weight_reference,
            bone_age: metrics.bone_age.years,
            bone_age_source: metrics.bone_age.source,
            bone_age_diff: metrics.bone_age_diff,
            velocity,
            risk_tier: classification.tier,
            risk_factors: classification.factors,
            advice: advice_for(classification.tier),
            notes,
        }
    }

    /// Chart data placing `observation` on the reference curves.
    #[must_use]
    pub fn growth_chart(&self, observation: &PatientObservation) -> GrowthChart {
        GrowthChart::build(&self.reference, observation)
    }
}

fn build_notes(
    observation: &PatientObservation,
    metrics: &MetricsBundle,
    factors: &RiskFactors,
    ceiling: f64,
) -> Vec<String> {
    let mut notes = Vec::new();

    match metrics.bone_age.source {
        BoneAgeSource::Manual => {}
        BoneAgeSource::External => notes.push(
            "Bone age comes from an automated estimate and has not been confirmed by a manual X-ray reading."
                .to_string(),
        ),
        BoneAgeSource::Heuristic => notes.push(
            "Bone age is a rough estimate from age and secondary signs, not a clinical assessment. A hand/wrist X-ray reading is needed to confirm it."
                .to_string(),
        ),
    }

    if metrics.velocity.is_none() {
        notes.push("No prior measurement supplied; growth velocity was not assessed.".to_string());
    }

    if factors.velocity_upgrade {
        notes.push(format!(
            "Tier raised to Medium: height velocity exceeds the normal ceiling of {ceiling} cm/year for age and sex."
        ));
    }

    if observation.family_history {
        notes.push(
            "Family history of early puberty recorded; report it to the examining clinician."
                .to_string(),
        );
    }

    notes
}
