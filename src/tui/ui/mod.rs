//! UI module: View components for the TUI.

pub mod chart;
pub mod patient;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::DISCLAIMER;
use crate::tui::styles::MedicalTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            format!("DISCLAIMER: {DISCLAIMER}"),
            MedicalTheme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "Bone age without an X-ray reading is a rough estimate.",
            MedicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
