//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the screening logic and where its reference data comes from.

mod reference_source;

pub use reference_source::ReferenceSource;
