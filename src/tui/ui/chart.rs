//! Growth chart widget: reference curves with the child's measurements.

use ratatui::{
    layout::Rect,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::application::MeasurementChart;
use crate::domain::Measurement;
use crate::tui::styles::MedicalTheme;

/// Render one measurement chart over `age_bounds`.
pub fn render_growth_chart(
    f: &mut Frame,
    area: Rect,
    chart: &MeasurementChart,
    age_bounds: (f64, f64),
) {
    let current = [chart.patient];
    let prior: Vec<(f64, f64)> = chart.prior.into_iter().collect();

    let mut datasets: Vec<Dataset> = chart
        .curves
        .iter()
        .map(|series| {
            Dataset::default()
                .name(series.percentile.to_string())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(MedicalTheme::percentile(series.percentile))
                .data(&series.points)
        })
        .collect();

    if !prior.is_empty() {
        datasets.push(
            Dataset::default()
                .name("Prior")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(MedicalTheme::text_secondary())
                .data(&prior),
        );
    }

    datasets.push(
        Dataset::default()
            .name("Child")
            .marker(symbols::Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(MedicalTheme::patient_point())
            .data(&current),
    );

    let name = match chart.measurement {
        Measurement::Height => "Height",
        Measurement::Weight => "Weight",
    };
    let title = format!(" {name} ({}) ", chart.measurement.unit());

    let x_axis = Axis::default()
        .title(Span::styled("Age (years)", MedicalTheme::text_muted()))
        .style(MedicalTheme::border())
        .bounds([age_bounds.0, age_bounds.1])
        .labels(axis_labels(age_bounds));

    let y_axis = Axis::default()
        .style(MedicalTheme::border())
        .bounds([chart.value_bounds.0, chart.value_bounds.1])
        .labels(axis_labels(chart.value_bounds));

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .title(Span::styled(title, MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    f.render_widget(widget, area);
}

/// Low, middle and high tick labels.
fn axis_labels((lo, hi): (f64, f64)) -> Vec<Span<'static>> {
    [lo, (lo + hi) / 2.0, hi]
        .into_iter()
        .map(|v| Span::styled(format!("{v:.0}"), MedicalTheme::text_muted()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::GrowthChart;
    use crate::domain::{Gender, PatientObservation, PriorMeasurement, ReferenceTable};
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_axis_labels() {
        let labels = axis_labels((2.0, 18.0));
        let text: Vec<String> = labels.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(text, ["2", "10", "18"]);
    }

    #[test]
    fn test_renders_without_panic() {
        let observation = PatientObservation {
            age: 8.0,
            gender: Gender::Male,
            height_cm: 130.0,
            weight_kg: 27.0,
            secondary_signs: 1,
            bone_age: None,
            family_history: false,
            prior_measurement: Some(PriorMeasurement {
                height_cm: 126.0,
                weight_kg: 25.0,
                months_elapsed: 6.0,
            }),
        };
        let chart = GrowthChart::build(ReferenceTable::standard(), &observation);

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| render_growth_chart(f, f.area(), &chart.height, chart.age_bounds))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let rendered: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("Height"));
    }
}
