//! One-shot screening from a JSON request.
//!
//! Reads an evaluation request, runs the screening and prints a JSON report
//! with the result, the reference table used and a timestamp.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin evaluate -- [--request <path>|-] [--reference <path>] \
//!     [--birth-date YYYY-MM-DD [--on YYYY-MM-DD]] [--compact]
//! ```
//!
//! The request is read from stdin when `--request` is omitted or `-`.
//! `--birth-date` replaces the request's `age` with the decimal age on the
//! `--on` date (today by default).
//!
//! Exit status is 2 for usage errors and 1 for any other failure.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use puberty_screen::adapters::JsonReferenceFile;
use puberty_screen::config::Settings;
use puberty_screen::domain::{decimal_age, EvaluationRequest};
use puberty_screen::ports::ReferenceSource;
use puberty_screen::{EvaluationResult, ScreeningService};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, PartialEq)]
struct Options {
    /// `None` reads stdin
    request: Option<PathBuf>,
    reference: Option<PathBuf>,
    birth_date: Option<NaiveDate>,
    on: Option<NaiveDate>,
    compact: bool,
}

#[derive(Serialize)]
struct ReferenceInfo {
    source: String,
    fingerprint: String,
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    reference: ReferenceInfo,
    result: &'a EvaluationResult,
}

fn usage() -> String {
    "Usage: evaluate [--request <path>|-] [--reference <path>] \
     [--birth-date YYYY-MM-DD [--on YYYY-MM-DD]] [--compact]"
        .to_string()
}

fn parse_date(flag: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| format!("{flag} must be a date in YYYY-MM-DD form"))
}

fn parse_args<I>(args: I) -> Result<Options, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--request" => {
                let v = args.next().ok_or_else(usage)?;
                options.request = (v != "-").then(|| PathBuf::from(v));
            }
            "--reference" => {
                let v = args.next().ok_or_else(usage)?;
                options.reference = Some(PathBuf::from(v));
            }
            "--birth-date" => {
                let v = args.next().ok_or_else(usage)?;
                options.birth_date = Some(parse_date("--birth-date", &v)?);
            }
            "--on" => {
                let v = args.next().ok_or_else(usage)?;
                options.on = Some(parse_date("--on", &v)?);
            }
            "--compact" => options.compact = true,
            "-h" | "--help" => return Err(usage()),
            _ => return Err(format!("Unknown argument: {arg}\n{}", usage())),
        }
    }

    if options.on.is_some() && options.birth_date.is_none() {
        return Err("--on requires --birth-date".to_string());
    }

    Ok(options)
}

fn read_request(options: &Options) -> Result<EvaluationRequest> {
    let mut request = match &options.request {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open request {}", path.display()))?;
            ScreeningService::read_request(file)
                .with_context(|| format!("Failed to read request {}", path.display()))?
        }
        None => ScreeningService::read_request(std::io::stdin().lock())
            .context("Failed to read request from stdin")?,
    };

    if let Some(birth) = options.birth_date {
        let on = options.on.unwrap_or_else(|| Local::now().date_naive());
        request.age = decimal_age(birth, on)
            .ok_or_else(|| anyhow!("Birth date {birth} is after evaluation date {on}"))?;
    }

    Ok(request)
}

fn run(options: &Options) -> Result<()> {
    let source: Box<dyn ReferenceSource> = match &options.reference {
        Some(path) => Box::new(JsonReferenceFile::new(path)),
        None => Settings::from_env().reference_source(),
    };
    let service = ScreeningService::from_source(source.as_ref())
        .with_context(|| format!("Failed to load {}", source.describe()))?;

    let request = read_request(options)?;
    let result = service.evaluate(&request)?;

    let report = Report {
        generated_at: Utc::now(),
        reference: ReferenceInfo {
            source: source.describe(),
            fingerprint: service.reference().fingerprint().to_string(),
        },
        result: &result,
    };

    let out = if options.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{out}");

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_defaults_read_stdin() {
        assert_eq!(parse_args(args(&[])).unwrap(), Options::default());
        let options = parse_args(args(&["--request", "-"])).unwrap();
        assert!(options.request.is_none());
    }

    #[test]
    fn test_all_flags() {
        let options = parse_args(args(&[
            "--request",
            "req.json",
            "--reference",
            "curves.json",
            "--birth-date",
            "2016-03-01",
            "--on",
            "2024-09-01",
            "--compact",
        ]))
        .unwrap();
        assert_eq!(options.request, Some(PathBuf::from("req.json")));
        assert_eq!(options.reference, Some(PathBuf::from("curves.json")));
        assert_eq!(options.birth_date, NaiveDate::from_ymd_opt(2016, 3, 1));
        assert_eq!(options.on, NaiveDate::from_ymd_opt(2024, 9, 1));
        assert!(options.compact);
    }

    #[test]
    fn test_usage_errors() {
        assert!(parse_args(args(&["--request"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["--birth-date", "01/03/2016"])).is_err());
        assert!(parse_args(args(&["--on", "2024-09-01"])).is_err());
    }

    #[test]
    fn test_birth_date_sets_age() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"age": 0, "gender": "male", "height_cm": 130, "weight_kg": 27}}"#
        )
        .unwrap();

        let options = Options {
            request: Some(file.path().to_path_buf()),
            birth_date: NaiveDate::from_ymd_opt(2016, 3, 1),
            on: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Options::default()
        };
        let request = read_request(&options).unwrap();
        assert_eq!(request.age, 8.0);
        assert_eq!(request.secondary_signs_count, 0);
    }

    #[test]
    fn test_birth_after_evaluation_date_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"age": 0, "gender": "F", "height_cm": 130, "weight_kg": 27}}"#
        )
        .unwrap();

        let options = Options {
            request: Some(file.path().to_path_buf()),
            birth_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            on: NaiveDate::from_ymd_opt(2020, 3, 1),
            ..Options::default()
        };
        assert!(read_request(&options).is_err());
    }
}
