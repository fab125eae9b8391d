//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Entering a child's measurements and observations
//! - Reviewing the screening result alongside growth charts

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
