//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the screening use case and the growth chart shown alongside it.

mod chart;
mod screening;

pub use chart::{ChartSeries, GrowthChart, MeasurementChart};
pub use screening::{EvaluationResult, ScreeningService, VelocityReport};
