//! Reference source port: Trait for obtaining growth reference curves.
//!
//! Abstracts where the percentile table comes from (compiled-in constants,
//! a JSON file) from the application logic.

use std::sync::Arc;

use crate::domain::{ReferenceError, ReferenceTable};

/// Trait for loading a validated reference table.
///
/// Implementations are called once at startup; the resulting table is shared
/// read-only by every evaluation.
pub trait ReferenceSource: Send + Sync {
    /// Load and validate the table.
    ///
    /// # Errors
    /// Returns `ReferenceError` if the data cannot be read or fails validation.
    fn load(&self) -> Result<Arc<ReferenceTable>, ReferenceError>;

    /// Short human-readable description for logs and reports.
    fn describe(&self) -> String;
}
