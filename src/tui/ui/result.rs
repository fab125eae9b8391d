//! Screening result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::chart::render_growth_chart;
use crate::application::{EvaluationResult, GrowthChart};
use crate::domain::{ReferenceValues, RiskTier};
use crate::tui::styles::MedicalTheme;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    /// Nothing evaluated yet
    #[default]
    Idle,
    /// Evaluation finished
    Complete {
        result: Box<EvaluationResult>,
        chart: Box<GrowthChart>,
    },
}

/// Render the screening result
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Idle => render_idle(f, chunks[1]),
        ResultState::Complete { result, chart } => {
            render_result_content(f, chunks[1], result, chart)
        }
    }
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Screening Result", MedicalTheme::title()),
        Span::styled(" │ Growth and maturation", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No screening has been run",
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_result_content(f: &mut Frame, area: Rect, result: &EvaluationResult, chart: &GrowthChart) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(columns[0]);

    render_tier(f, left[0], result);
    render_findings(f, left[1], result);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[1]);

    render_growth_chart(f, charts[0], &chart.height, chart.age_bounds);
    render_growth_chart(f, charts[1], &chart.weight, chart.age_bounds);
}

fn render_tier(f: &mut Frame, area: Rect, result: &EvaluationResult) {
    let risk_style = MedicalTheme::risk_tier(result.risk_tier);
    let risk_icon = match result.risk_tier {
        RiskTier::Low => "OK",
        RiskTier::Medium | RiskTier::High => "!",
    };

    let tier = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} {}", risk_icon, result.risk_tier),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            result.risk_tier.description(),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(risk_style),
    );

    f.render_widget(tier, area);
}

fn render_findings(f: &mut Frame, area: Rect, result: &EvaluationResult) {
    let block = Block::default()
        .title(Span::styled(" Findings ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let p = Paragraph::new(findings_lines(result))
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(p, area);
}

/// Text body of the findings panel.
fn findings_lines(result: &EvaluationResult) -> Vec<Line<'static>> {
    let mut lines = vec![
        metric_line("BMI", format!("{:.1} kg/m²", result.bmi)),
        band_line("Height", result, true),
        band_line("Weight", result, false),
    ];

    let bone_style = if result.bone_age_source.is_clinical() {
        MedicalTheme::text()
    } else {
        MedicalTheme::warning()
    };
    lines.push(Line::from(vec![
        Span::styled("Bone age: ", MedicalTheme::text_secondary()),
        Span::styled(format!("{:.1} y ", result.bone_age), MedicalTheme::text()),
        Span::styled(format!("({})", result.bone_age_source), bone_style),
    ]));
    lines.push(metric_line(
        "Bone age - age",
        format!("{:+.1} y", result.bone_age_diff),
    ));

    match &result.velocity {
        Some(v) => {
            let style = if v.accelerated {
                MedicalTheme::warning()
            } else {
                MedicalTheme::text()
            };
            lines.push(Line::from(vec![
                Span::styled("Height velocity: ", MedicalTheme::text_secondary()),
                Span::styled(format!("{:.1} cm/y", v.height_per_year), style),
                Span::styled(
                    format!(" (ceiling {:.0})", v.ceiling),
                    MedicalTheme::text_muted(),
                ),
            ]));
            lines.push(metric_line(
                "Weight velocity",
                format!("{:.1} kg/y", v.weight_per_year),
            ));
        }
        None => lines.push(Line::from(Span::styled(
            "Growth velocity not assessed",
            MedicalTheme::text_muted(),
        ))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        result.advice.headline,
        MedicalTheme::risk_tier(result.risk_tier).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        result.advice.summary,
        MedicalTheme::text_secondary(),
    )));
    for rec in result.advice.recommendations {
        lines.push(Line::from(vec![
            Span::styled("• ", MedicalTheme::info()),
            Span::styled(*rec, MedicalTheme::text()),
        ]));
    }

    if !result.notes.is_empty() {
        lines.push(Line::from(""));
        for note in &result.notes {
            lines.push(Line::from(vec![
                Span::styled("Note: ", MedicalTheme::warning()),
                Span::styled(note.clone(), MedicalTheme::text_muted()),
            ]));
        }
    }

    lines
}

fn metric_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), MedicalTheme::text_secondary()),
        Span::styled(value, MedicalTheme::text()),
    ])
}

fn band_line(label: &str, result: &EvaluationResult, height: bool) -> Line<'static> {
    let (band, reference): (_, &ReferenceValues) = if height {
        (result.height_band, &result.height_reference)
    } else {
        (result.weight_band, &result.weight_reference)
    };

    Line::from(vec![
        Span::styled(format!("{label}: "), MedicalTheme::text_secondary()),
        Span::styled(band.label(), MedicalTheme::band(band)),
        Span::styled(
            format!(
                "  [P3 {:.1} · P50 {:.1} · P97 {:.1}]",
                reference.p3, reference.p50, reference.p97
            ),
            MedicalTheme::text_muted(),
        ),
    ])
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Screening ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back ", MedicalTheme::key_desc()),
        Span::styled("[Q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ScreeningService;
    use crate::domain::EvaluationRequest;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn result() -> EvaluationResult {
        ScreeningService::default()
            .evaluate(&EvaluationRequest {
                age: 7.0,
                gender: "F".to_string(),
                height_cm: 118.0,
                weight_kg: 22.0,
                secondary_signs_count: 3,
                bone_age_known: false,
                bone_age: None,
                family_history: false,
                prior_measurement: None,
            })
            .unwrap()
    }

    #[test]
    fn test_findings_mention_sources_and_advice() {
        let text: Vec<String> = findings_lines(&result()).iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.contains("heuristic estimate")));
        assert!(text.iter().any(|l| l == "Growth velocity not assessed"));
        assert!(text.iter().any(|l| l.starts_with("Note: ")));
        assert!(text.iter().any(|l| l.starts_with("Height: ")));
    }
}
