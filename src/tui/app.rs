//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::application::ScreeningService;
use crate::config::Settings;

use super::ui::{
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    PatientForm,
    Result,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Screening service over the loaded reference table
    service: ScreeningService,

    /// Measurement form state
    patient_form_state: PatientFormState,

    /// Result state
    result_state: ResultState,
}

impl App {
    /// Create a new application instance from settings.
    ///
    /// Loads the reference table selected by `settings`.
    ///
    /// # Errors
    /// Returns error if the reference table cannot be loaded.
    pub fn new(settings: &Settings) -> Result<Self> {
        let source = settings.reference_source();
        let service = ScreeningService::from_source(source.as_ref())?;
        Ok(Self::with_dependencies(service))
    }

    /// Create application with an injected service (Composition Root pattern).
    #[must_use]
    pub fn with_dependencies(service: ScreeningService) -> Self {
        Self {
            screen: Screen::PatientForm,
            should_quit: false,
            service,
            patient_form_state: PatientFormState::default(),
            result_state: ResultState::default(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::PatientForm => {
                        render_patient_form(f, chunks[0], &self.patient_form_state)
                    }
                    Screen::Result => render_result(f, chunks[0], &self.result_state),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::PatientForm => self.handle_patient_form_key(key, modifiers),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.patient_form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.patient_form_state.next_field();
            }
            KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.patient_form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.patient_form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.patient_form_state.delete_char();
            }
            KeyCode::Delete => {
                self.patient_form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_patient_form();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter => {
                self.patient_form_state = PatientFormState::default();
                self.result_state = ResultState::Idle;
                self.screen = Screen::PatientForm;
            }
            KeyCode::Esc => {
                self.screen = Screen::PatientForm;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        let request = match self.patient_form_state.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.patient_form_state.error_message = Some(e);
                return;
            }
        };

        let observation = match self.service.validate(&request) {
            Ok(observation) => observation,
            Err(e) => {
                tracing::debug!("Form rejected: {}", e);
                self.patient_form_state.error_message = Some(e.to_string());
                return;
            }
        };

        let result = self.service.evaluate_observation(&observation);
        let chart = self.service.growth_chart(&observation);
        self.result_state = ResultState::Complete {
            result: Box::new(result),
            chart: Box::new(chart),
        };
        self.screen = Screen::Result;

        // Clear plaintext buffers from the UI immediately.
        self.patient_form_state.clear_sensitive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskTier;

    fn app() -> App {
        App::with_dependencies(ScreeningService::default())
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_sample_submission_shows_result() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Result);
        match &app.result_state {
            ResultState::Complete { result, .. } => assert_eq!(result.risk_tier, RiskTier::High),
            ResultState::Idle => panic!("expected a result"),
        }
        assert!(app
            .patient_form_state
            .fields
            .iter()
            .all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_invalid_form_stays_on_form() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::PatientForm);
        assert_eq!(
            app.patient_form_state.error_message.as_deref(),
            Some("Age: Required")
        );
    }

    #[test]
    fn test_out_of_range_reported_by_service() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        app.patient_form_state.fields[0].value = "25".to_string();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::PatientForm);
        let message = app.patient_form_state.error_message.clone().unwrap();
        assert!(message.contains("Age 25 out of range"), "{message}");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = self::app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_new_screening_resets_state() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::PatientForm);
        assert!(matches!(app.result_state, ResultState::Idle));
    }
}
