//! Child measurement input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{EvaluationRequest, PriorMeasurement};
use crate::tui::styles::MedicalTheme;
use zeroize::Zeroize;

/// What a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Required decimal number
    Number,
    /// Decimal number that may be left blank
    OptionalNumber,
    /// Non-negative whole number, blank means zero
    Count,
    /// `F` or `M`
    Sex,
    /// `Y` or `N`, blank means no
    YesNo,
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
    pub value: String,
}

impl FormField {
    fn new(label: &'static str, hint: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            hint,
            kind,
            value: String::new(),
        }
    }
}

const AGE: usize = 0;
const SEX: usize = 1;
const HEIGHT: usize = 2;
const WEIGHT: usize = 3;
const SIGNS: usize = 4;
const BONE_AGE: usize = 5;
const BONE_AGE_READ: usize = 6;
const FAMILY_HISTORY: usize = 7;
const PRIOR_HEIGHT: usize = 8;
const PRIOR_WEIGHT: usize = 9;
const PRIOR_MONTHS: usize = 10;

/// Measurement form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        use FieldKind::*;

        Self {
            fields: vec![
                FormField::new("Age", "years (2-19)", Number),
                FormField::new("Sex", "F or M", Sex),
                FormField::new("Height", "cm", Number),
                FormField::new("Weight", "kg", Number),
                FormField::new("Secondary Signs", "count observed (0 if none)", Count),
                FormField::new("Bone Age", "years, blank to estimate", OptionalNumber),
                FormField::new("Bone Age From X-ray", "Y or N", YesNo),
                FormField::new("Family History", "Y or N", YesNo),
                FormField::new("Prior Height", "cm, optional", OptionalNumber),
                FormField::new("Prior Weight", "kg, optional", OptionalNumber),
                FormField::new("Months Since Prior", "months, optional", OptionalNumber),
            ],
            selected_field: 0,
            error_message: None,
        }
    }
}

impl PatientFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add a character to the current field.
    ///
    /// Characters the field cannot hold are ignored. Choice fields replace
    /// their value instead of appending.
    pub fn input_char(&mut self, c: char) {
        let field = &mut self.fields[self.selected_field];
        let accepted = match field.kind {
            FieldKind::Number | FieldKind::OptionalNumber => {
                if c.is_ascii_digit() || (c == '.' && !field.value.contains('.')) {
                    field.value.push(c);
                    true
                } else {
                    false
                }
            }
            FieldKind::Count => {
                if c.is_ascii_digit() {
                    field.value.push(c);
                    true
                } else {
                    false
                }
            }
            FieldKind::Sex => match c.to_ascii_uppercase() {
                choice @ ('F' | 'M') => {
                    field.value = choice.to_string();
                    true
                }
                _ => false,
            },
            FieldKind::YesNo => match c.to_ascii_uppercase() {
                choice @ ('Y' | 'N') => {
                    field.value = choice.to_string();
                    true
                }
                _ => false,
            },
        };

        if accepted {
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.clear();
    }

    /// Wipe all field buffers from memory and clear values.
    ///
    /// Called once a screening has been produced so the child's measurements
    /// do not linger in the form.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Parse the fields into a request.
    ///
    /// Only checks that the text is well formed; range checks are left to the
    /// screening service.
    pub fn to_request(&self) -> Result<EvaluationRequest, String> {
        let age = self.number(AGE)?;
        let gender = self.required(SEX)?.to_string();
        let height_cm = self.number(HEIGHT)?;
        let weight_kg = self.number(WEIGHT)?;
        let secondary_signs_count = self.count(SIGNS)?;
        let bone_age = self.optional_number(BONE_AGE)?;
        let prior = [PRIOR_HEIGHT, PRIOR_WEIGHT, PRIOR_MONTHS]
            .map(|i| self.optional_number(i));
        let prior_measurement = match prior {
            [Ok(None), Ok(None), Ok(None)] => None,
            [Ok(Some(height_cm)), Ok(Some(weight_kg)), Ok(Some(months_elapsed))] => {
                Some(PriorMeasurement {
                    height_cm,
                    weight_kg,
                    months_elapsed,
                })
            }
            [height, weight, months] => {
                height?;
                weight?;
                months?;
                return Err(
                    "Prior measurement needs height, weight and months, or none of them"
                        .to_string(),
                );
            }
        };

        Ok(EvaluationRequest {
            age,
            gender,
            height_cm,
            weight_kg,
            secondary_signs_count,
            bone_age_known: bone_age.is_some() && self.yes(BONE_AGE_READ),
            bone_age,
            family_history: self.yes(FAMILY_HISTORY),
            prior_measurement,
        })
    }

    fn required(&self, index: usize) -> Result<&str, String> {
        let field = &self.fields[index];
        let value = field.value.trim();
        if value.is_empty() {
            return Err(format!("{}: Required", field.label));
        }
        Ok(value)
    }

    fn number(&self, index: usize) -> Result<f64, String> {
        let value = self.required(index)?;
        value
            .parse()
            .map_err(|_| format!("{}: Invalid number", self.fields[index].label))
    }

    fn optional_number(&self, index: usize) -> Result<Option<f64>, String> {
        if self.fields[index].value.trim().is_empty() {
            return Ok(None);
        }
        self.number(index).map(Some)
    }

    fn count(&self, index: usize) -> Result<i64, String> {
        let field = &self.fields[index];
        let value = field.value.trim();
        if value.is_empty() {
            return Ok(0);
        }
        value
            .parse()
            .map_err(|_| format!("{}: Invalid count", field.label))
    }

    fn yes(&self, index: usize) -> bool {
        self.fields[index].value.eq_ignore_ascii_case("y")
    }

    /// Load sample data for testing (girl with several early indicators)
    pub fn load_sample_data(&mut self) {
        let sample = [
            "7.5", // age (years)
            "F",   // sex
            "132", // height (cm)
            "30",  // weight (kg)
            "3",   // secondary signs
            "10",  // bone age (years)
            "Y",   // bone age read from X-ray
            "N",   // family history
            "127", // prior height (cm)
            "27",  // prior weight (kg)
            "6",   // months since prior
        ];
        for (field, val) in self.fields.iter_mut().zip(sample) {
            field.value = val.to_string();
        }
        self.error_message = None;
    }
}

/// Render the measurement input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Early Puberty Screening", MedicalTheme::title()),
        Span::styled(
            " │ Measurements and observations",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let border_style = if is_selected {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        };

        let title_style = if is_selected {
            MedicalTheme::focused()
        } else {
            MedicalTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = if field.value.is_empty() {
            Span::styled(field.hint, MedicalTheme::text_muted())
        } else {
            Span::styled(field.value.as_str(), MedicalTheme::text())
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected {
                Span::styled("▌", MedicalTheme::cursor())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.as_str(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Evaluate ", MedicalTheme::key_desc()),
            Span::styled("[Ctrl-S] ", MedicalTheme::key_hint()),
            Span::styled("Sample Data ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
