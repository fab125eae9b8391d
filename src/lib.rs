//! # puberty-screen
//!
//! Early puberty screening calculator.
//!
//! This crate provides:
//! - Growth percentile placement against P3/P50/P97 reference curves
//! - BMI, bone-age advancement and growth-velocity metrics
//! - A fixed decision table mapping those metrics to a risk tier
//! - Terminal UI and a JSON command-line front-end
//!
//! Results are a preliminary screening aid, not a diagnosis.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core screening types and rules (pure, no I/O)
//! - `ports`: Trait definitions for external data (reference curves)
//! - `adapters`: Concrete reference sources (built-in, JSON file)
//! - `application`: The screening service orchestrating the pipeline
//! - `config`: Environment-driven settings
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use application::{EvaluationResult, ScreeningService};
pub use domain::{EvaluationRequest, Gender, RiskTier};

/// Result type for screening operations
pub type Result<T> = std::result::Result<T, ScreeningError>;

/// Main error type for screening operations
#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Reference table error: {0}")]
    Reference(#[from] domain::ReferenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
