//! Medical-themed color palette and styles.
//!
//! Colors chosen for:
//! - Professional healthcare appearance
//! - High contrast for accessibility
//! - Calm associations for a pediatric setting

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{Percentile, PercentileBand, RiskTier};

/// Medical theme color palette.
pub struct MedicalTheme;

impl MedicalTheme {
    // === Primary Colors ===

    /// Deep teal - Primary color (trust, medical)
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488

    /// Lighter teal for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    // === Secondary Colors ===

    /// Light slate for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    /// Amber - Warnings, out-of-range bands
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24

    /// Rose - Errors
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E

    /// Blue - Info, patient markers
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    // === Text Colors ===

    /// Primary text (white)
    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC

    /// Secondary text (gray)
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8

    /// Muted text
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    /// Style for titles
    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for subtitles
    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Style for focused elements
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the input cursor
    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Style for key hints
    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for key descriptions
    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Get risk tier style
    #[must_use]
    pub fn risk_tier(tier: RiskTier) -> Style {
        let (r, g, b) = tier.color();
        Style::default().fg(Color::Rgb(r, g, b))
    }

    /// Bands outside P3-P97 are highlighted.
    #[must_use]
    pub fn band(band: PercentileBand) -> Style {
        match band {
            PercentileBand::BelowP3 | PercentileBand::AboveP97 => Self::warning(),
            PercentileBand::P3ToP50 | PercentileBand::P50ToP97 => Self::text(),
        }
    }

    /// Line style of a reference curve
    #[must_use]
    pub fn percentile(percentile: Percentile) -> Style {
        match percentile {
            Percentile::P50 => Style::default().fg(Self::PRIMARY),
            Percentile::P3 | Percentile::P97 => Style::default().fg(Self::TEXT_MUTED),
        }
    }

    /// Marker style for the child's measurement
    #[must_use]
    pub fn patient_point() -> Style {
        Style::default().fg(Self::INFO).add_modifier(Modifier::BOLD)
    }
}
