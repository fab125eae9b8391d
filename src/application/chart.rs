//! Growth chart data.
//!
//! Plot-ready series: the reference curves at their knots plus the child's
//! current (and, when known, prior) measurement.

use serde::Serialize;

use crate::domain::{Measurement, PatientObservation, Percentile, ReferenceTable};

/// One reference curve as `(age, value)` points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub percentile: Percentile,
    pub points: Vec<(f64, f64)>,
}

/// Curves and patient points for one measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementChart {
    pub measurement: Measurement,
    pub curves: Vec<ChartSeries>,
    pub patient: (f64, f64),
    pub prior: Option<(f64, f64)>,
    /// Y-axis range covering every curve and point
    pub value_bounds: (f64, f64),
}

/// Height and weight charts sharing the age axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthChart {
    pub age_bounds: (f64, f64),
    pub height: MeasurementChart,
    pub weight: MeasurementChart,
}

impl GrowthChart {
    #[must_use]
    pub fn build(table: &ReferenceTable, observation: &PatientObservation) -> Self {
        let prior_age = observation
            .prior_measurement
            .map(|p| observation.age - p.months_elapsed / 12.0);

        let height = measurement_chart(
            table,
            Measurement::Height,
            (observation.age, observation.height_cm),
            prior_age.zip(observation.prior_measurement.map(|p| p.height_cm)),
        );
        let weight = measurement_chart(
            table,
            Measurement::Weight,
            (observation.age, observation.weight_kg),
            prior_age.zip(observation.prior_measurement.map(|p| p.weight_kg)),
        );

        let (first, last) = table.age_range();
        let min_age = prior_age.map_or(first, |a| a.min(first)).min(observation.age);
        let max_age = last.max(observation.age);

        Self {
            age_bounds: (min_age.floor(), max_age.ceil()),
            height,
            weight,
        }
    }

    #[must_use]
    pub fn chart(&self, measurement: Measurement) -> &MeasurementChart {
        match measurement {
            Measurement::Height => &self.height,
            Measurement::Weight => &self.weight,
        }
    }
}

fn measurement_chart(
    table: &ReferenceTable,
    measurement: Measurement,
    patient: (f64, f64),
    prior: Option<(f64, f64)>,
) -> MeasurementChart {
    let curves: Vec<ChartSeries> = Percentile::ALL
        .iter()
        .map(|&percentile| ChartSeries {
            percentile,
            points: table.curves(measurement).curve(percentile).points().to_vec(),
        })
        .collect();

    let values = curves
        .iter()
        .flat_map(|c| c.points.iter().map(|&(_, v)| v))
        .chain(std::iter::once(patient.1))
        .chain(prior.map(|(_, v)| v));
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    MeasurementChart {
        measurement,
        curves,
        patient,
        prior,
        value_bounds: ((lo / 10.0).floor() * 10.0, (hi / 10.0).ceil() * 10.0),
    }
}
