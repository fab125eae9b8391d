//! JSON adapter: Loads reference curves from a file on disk.
//!
//! The file uses the [`ReferenceData`](crate::domain::ReferenceData) layout:
//!
//! ```json
//! {
//!   "ages":   [2, 3, ...],
//!   "height": { "p3": [...], "p50": [...], "p97": [...] },
//!   "weight": { "p3": [...], "p50": [...], "p97": [...] }
//! }
//! ```
//!
//! A directory may be given instead of a file; it must contain
//! `reference.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{ReferenceError, ReferenceTable};
use crate::ports::ReferenceSource;

/// File name looked up when the configured path is a directory.
pub const DEFAULT_FILE_NAME: &str = "reference.json";

/// Upper bound on the reference file size.
const MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Reference source backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonReferenceFile {
    path: PathBuf,
}

impl JsonReferenceFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn resolve(&self) -> PathBuf {
        let path = self.path();
        if path.is_dir() {
            path.join(DEFAULT_FILE_NAME)
        } else {
            path.to_path_buf()
        }
    }
}

impl ReferenceSource for JsonReferenceFile {
    fn load(&self) -> Result<Arc<ReferenceTable>, ReferenceError> {
        let path = self.resolve();

        let metadata = std::fs::metadata(&path)
            .map_err(|e| ReferenceError::Io(format!("{}: {e}", path.display())))?;
        if metadata.len() > MAX_FILE_BYTES {
            return Err(ReferenceError::Io(format!(
                "{}: file is {} bytes, limit is {MAX_FILE_BYTES}",
                path.display(),
                metadata.len()
            )));
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ReferenceError::Io(format!("{}: {e}", path.display())))?;
        let table = ReferenceTable::from_json(&content)?;

        let (first, last) = table.age_range();
        tracing::info!(
            "Loaded reference table from {:?} (ages {}-{}, fingerprint {})",
            path,
            first,
            last,
            &table.fingerprint()[..12]
        );

        Ok(Arc::new(table))
    }

    fn describe(&self) -> String {
        format!("JSON reference file {}", self.path().display())
    }
}
