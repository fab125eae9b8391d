//! Growth reference curves.
//!
//! Height and weight percentile curves (P3, P50, P97) indexed by age in years,
//! with piecewise-linear interpolation between the yearly knots. The source
//! data does not differentiate by sex, so one table serves both.
//!
//! The built-in table is initialised once and shared read-only. Alternative
//! tables can be loaded from JSON with the same layout as [`ReferenceData`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Knot ages of the built-in table (years).
const AGES: [f64; 18] = [
    2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0,
    19.0,
];

// Height (cm)
const HEIGHT_P3: [f64; 18] = [
    81.0, 90.0, 97.0, 103.0, 108.0, 113.0, 118.0, 122.0, 126.0, 131.0, 136.0, 141.0, 147.0, 151.0,
    153.0, 154.0, 155.0, 156.0,
];
const HEIGHT_P50: [f64; 18] = [
    87.0, 96.0, 103.0, 109.0, 114.0, 119.0, 124.0, 128.0, 133.0, 138.0, 144.0, 150.0, 156.0, 159.0,
    161.0, 162.0, 163.0, 164.0,
];
const HEIGHT_P97: [f64; 18] = [
    93.0, 102.0, 109.0, 115.0, 120.0, 125.0, 130.0, 134.0, 138.0, 144.0, 150.0, 157.0, 164.0,
    167.0, 169.0, 170.0, 171.0, 172.0,
];

// Weight (kg)
const WEIGHT_P3: [f64; 18] = [
    10.0, 12.0, 14.0, 15.0, 17.0, 18.0, 20.0, 22.0, 24.0, 27.0, 30.0, 34.0, 38.0, 42.0, 45.0, 47.0,
    48.0, 49.0,
];
const WEIGHT_P50: [f64; 18] = [
    12.0, 14.0, 16.0, 18.0, 20.0, 22.0, 25.0, 28.0, 32.0, 36.0, 41.0, 47.0, 52.0, 55.0, 57.0, 58.0,
    59.0, 60.0,
];
const WEIGHT_P97: [f64; 18] = [
    14.0, 17.0, 20.0, 23.0, 26.0, 30.0, 35.0, 40.0, 45.0, 50.0, 58.0, 65.0, 72.0, 78.0, 82.0, 85.0,
    87.0, 90.0,
];

static STANDARD_TABLE: OnceLock<Arc<ReferenceTable>> = OnceLock::new();

/// Errors raised while building a reference table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReferenceError {
    #[error("A curve needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("Ages must be finite and strictly increasing (violated at index {0})")]
    UnorderedAges(usize),

    #[error("{measurement} {percentile} has {got} values, expected {expected}")]
    LengthMismatch {
        measurement: Measurement,
        percentile: Percentile,
        got: usize,
        expected: usize,
    },

    #[error("{measurement} {percentile} at age {age}: value must be finite and positive")]
    InvalidValue {
        measurement: Measurement,
        percentile: Percentile,
        age: f64,
    },

    #[error("{measurement} percentiles are out of order at age {age}")]
    CrossedPercentiles { measurement: Measurement, age: f64 },

    #[error("Cannot read reference table: {0}")]
    Io(String),

    #[error("Malformed reference table: {0}")]
    Parse(String),
}

/// Anthropometric measurement covered by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measurement {
    Height,
    Weight,
}

impl Measurement {
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Height => "cm",
            Self::Weight => "kg",
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Height => write!(f, "height"),
            Self::Weight => write!(f, "weight"),
        }
    }
}

/// Percentile band of a reference curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Percentile {
    P3,
    P50,
    P97,
}

impl Percentile {
    pub const ALL: [Percentile; 3] = [Percentile::P3, Percentile::P50, Percentile::P97];
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::P3 => write!(f, "P3"),
            Self::P50 => write!(f, "P50"),
            Self::P97 => write!(f, "P97"),
        }
    }
}

/// A single percentile curve: `(age, value)` knots sorted by age.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCurve {
    points: Vec<(f64, f64)>,
}

impl ReferenceCurve {
    /// Build a curve from knots.
    ///
    /// # Errors
    /// Fails if there are fewer than two knots or ages are not strictly increasing.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, ReferenceError> {
        if points.len() < 2 {
            return Err(ReferenceError::TooFewPoints(points.len()));
        }
        if let Some(i) = points.iter().position(|(age, _)| !age.is_finite()) {
            return Err(ReferenceError::UnorderedAges(i));
        }
        if let Some(i) = points.windows(2).position(|w| w[1].0 <= w[0].0) {
            return Err(ReferenceError::UnorderedAges(i + 1));
        }
        Ok(Self { points })
    }

    /// Knots of this curve.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Interpolated value at `age`.
    ///
    /// Linear between the two bracketing knots; ages outside the table are
    /// clamped to the first or last knot value.
    #[must_use]
    pub fn value_at(&self, age: f64) -> f64 {
        let (first_age, first_value) = self.points[0];
        let (last_age, last_value) = self.points[self.points.len() - 1];

        // NaN lands here too.
        if !(age > first_age) {
            return first_value;
        }
        if age >= last_age {
            return last_value;
        }

        // first_age < age < last_age, so 1 <= upper < len.
        let upper = self.points.partition_point(|&(a, _)| a <= age);
        let (x0, y0) = self.points[upper - 1];
        let (x1, y1) = self.points[upper];

        y0 + (y1 - y0) * (age - x0) / (x1 - x0)
    }
}

/// Interpolated P3/P50/P97 values at one age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceValues {
    pub p3: f64,
    pub p50: f64,
    pub p97: f64,
}

/// The three percentile curves of one measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileCurves {
    p3: ReferenceCurve,
    p50: ReferenceCurve,
    p97: ReferenceCurve,
}

impl PercentileCurves {
    #[must_use]
    pub fn curve(&self, percentile: Percentile) -> &ReferenceCurve {
        match percentile {
            Percentile::P3 => &self.p3,
            Percentile::P50 => &self.p50,
            Percentile::P97 => &self.p97,
        }
    }

    /// Interpolate all three curves at `age`.
    #[must_use]
    pub fn at(&self, age: f64) -> ReferenceValues {
        ReferenceValues {
            p3: self.p3.value_at(age),
            p50: self.p50.value_at(age),
            p97: self.p97.value_at(age),
        }
    }
}

/// Serialized layout of a reference table.
///
/// All series share the `ages` knots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub ages: Vec<f64>,
    pub height: SeriesData,
    pub weight: SeriesData,
}

/// P3/P50/P97 values of one measurement, aligned with [`ReferenceData::ages`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub p3: Vec<f64>,
    pub p50: Vec<f64>,
    pub p97: Vec<f64>,
}

impl SeriesData {
    fn series(&self, percentile: Percentile) -> &[f64] {
        match percentile {
            Percentile::P3 => &self.p3,
            Percentile::P50 => &self.p50,
            Percentile::P97 => &self.p97,
        }
    }
}

/// Validated height and weight reference curves.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    height: PercentileCurves,
    weight: PercentileCurves,
    fingerprint: String,
}

impl ReferenceTable {
    /// The built-in clinical reference table (ages 2–19).
    #[must_use]
    pub fn standard() -> &'static ReferenceTable {
        Self::standard_arc()
    }

    /// Handle to the built-in table; every call shares the same allocation.
    #[must_use]
    pub fn shared() -> Arc<ReferenceTable> {
        Arc::clone(Self::standard_arc())
    }

    fn standard_arc() -> &'static Arc<ReferenceTable> {
        STANDARD_TABLE.get_or_init(|| {
            Arc::new(
                ReferenceTable::try_from(Self::standard_data())
                    .expect("Built-in reference table is valid"),
            )
        })
    }

    /// Raw data of the built-in table.
    #[must_use]
    pub fn standard_data() -> ReferenceData {
        ReferenceData {
            ages: AGES.to_vec(),
            height: SeriesData {
                p3: HEIGHT_P3.to_vec(),
                p50: HEIGHT_P50.to_vec(),
                p97: HEIGHT_P97.to_vec(),
            },
            weight: SeriesData {
                p3: WEIGHT_P3.to_vec(),
                p50: WEIGHT_P50.to_vec(),
                p97: WEIGHT_P97.to_vec(),
            },
        }
    }

    /// Parse and validate a table from JSON.
    ///
    /// # Errors
    /// Returns `ReferenceError::Parse` for malformed JSON, or a shape error if
    /// the data fails validation.
    pub fn from_json(json: &str) -> Result<Self, ReferenceError> {
        let data: ReferenceData =
            serde_json::from_str(json).map_err(|e| ReferenceError::Parse(e.to_string()))?;
        Self::try_from(data)
    }

    #[must_use]
    pub fn height(&self) -> &PercentileCurves {
        &self.height
    }

    #[must_use]
    pub fn weight(&self) -> &PercentileCurves {
        &self.weight
    }

    #[must_use]
    pub fn curves(&self, measurement: Measurement) -> &PercentileCurves {
        match measurement {
            Measurement::Height => &self.height,
            Measurement::Weight => &self.weight,
        }
    }

    /// Age range covered by the knots.
    #[must_use]
    pub fn age_range(&self) -> (f64, f64) {
        let points = self.height.p3.points();
        (points[0].0, points[points.len() - 1].0)
    }

    /// SHA-256 (hex) of the table's canonical JSON form.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Convert back to the serialized layout.
    #[must_use]
    pub fn to_data(&self) -> ReferenceData {
        let series = |curves: &PercentileCurves, p: Percentile| -> Vec<f64> {
            curves.curve(p).points().iter().map(|&(_, v)| v).collect()
        };
        ReferenceData {
            ages: self.height.p3.points().iter().map(|&(a, _)| a).collect(),
            height: SeriesData {
                p3: series(&self.height, Percentile::P3),
                p50: series(&self.height, Percentile::P50),
                p97: series(&self.height, Percentile::P97),
            },
            weight: SeriesData {
                p3: series(&self.weight, Percentile::P3),
                p50: series(&self.weight, Percentile::P50),
                p97: series(&self.weight, Percentile::P97),
            },
        }
    }
}

fn build_curves(
    ages: &[f64],
    measurement: Measurement,
    data: &SeriesData,
) -> Result<PercentileCurves, ReferenceError> {
    for percentile in Percentile::ALL {
        let series = data.series(percentile);
        if series.len() != ages.len() {
            return Err(ReferenceError::LengthMismatch {
                measurement,
                percentile,
                got: series.len(),
                expected: ages.len(),
            });
        }
        if let Some(i) = series.iter().position(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ReferenceError::InvalidValue {
                measurement,
                percentile,
                age: ages[i],
            });
        }
    }

    for (i, &age) in ages.iter().enumerate() {
        if data.p3[i] > data.p50[i] || data.p50[i] > data.p97[i] {
            return Err(ReferenceError::CrossedPercentiles { measurement, age });
        }
    }

    let curve = |values: &[f64]| {
        ReferenceCurve::new(ages.iter().copied().zip(values.iter().copied()).collect())
    };

    Ok(PercentileCurves {
        p3: curve(&data.p3)?,
        p50: curve(&data.p50)?,
        p97: curve(&data.p97)?,
    })
}

impl TryFrom<ReferenceData> for ReferenceTable {
    type Error = ReferenceError;

    fn try_from(data: ReferenceData) -> Result<Self, Self::Error> {
        // Validates the knot ages once for all six curves.
        ReferenceCurve::new(data.ages.iter().map(|&a| (a, 0.0)).collect())?;

        let height = build_curves(&data.ages, Measurement::Height, &data.height)?;
        let weight = build_curves(&data.ages, Measurement::Weight, &data.weight)?;

        let canonical =
            serde_json::to_vec(&data).map_err(|e| ReferenceError::Parse(e.to_string()))?;
        let fingerprint = Sha256::digest(&canonical)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();

        Ok(Self {
            height,
            weight,
            fingerprint,
        })
    }
}
