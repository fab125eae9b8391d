//! Runtime settings read from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `PUBERTY_SCREEN_LOG_MODE` | `auto` | `file`, `stdout` or `auto` (file when attached to a terminal) |
//! | `PUBERTY_SCREEN_LOG_FILE` | `puberty-screen.log` | Log file path in file mode |
//! | `PUBERTY_SCREEN_REFERENCE_PATH` | unset | JSON reference table (file or directory) |

use std::path::PathBuf;

use crate::adapters::{BuiltinReference, JsonReferenceFile};
use crate::ports::ReferenceSource;

pub const LOG_MODE_ENV: &str = "PUBERTY_SCREEN_LOG_MODE";
pub const LOG_FILE_ENV: &str = "PUBERTY_SCREEN_LOG_FILE";
pub const REFERENCE_PATH_ENV: &str = "PUBERTY_SCREEN_REFERENCE_PATH";

const DEFAULT_LOG_FILE: &str = "puberty-screen.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    File,
    Stdout,
    /// File when stdout is a terminal, stdout otherwise
    Auto,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Whether to log to a file, given whether stdout is interactive.
    ///
    /// Writing logs to the terminal would corrupt the TUI's alternate screen.
    #[must_use]
    pub fn use_file(&self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub reference_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            reference_path: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            log_mode: non_empty(LOG_MODE_ENV)
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: non_empty(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            reference_path: non_empty(REFERENCE_PATH_ENV).map(PathBuf::from),
        }
    }

    /// Reference source selected by these settings.
    #[must_use]
    pub fn reference_source(&self) -> Box<dyn ReferenceSource> {
        match &self.reference_path {
            Some(path) => Box::new(JsonReferenceFile::new(path)),
            None => Box::new(BuiltinReference),
        }
    }
}
