//! Duplicate report written at the end of a run.
//!
//! Each suppressed duplicate becomes one `source,kept` row in
//! `<dest>/warn.csv`. No header row is written.

use crate::dedup::SkippedEntry;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the duplicate report inside the destination root.
pub const REPORT_FILE_NAME: &str = "warn.csv";

/// Errors that can occur while writing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write warnings to {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Returns the report location for a destination root.
pub fn report_path(dest_root: &Path) -> PathBuf {
    dest_root.join(REPORT_FILE_NAME)
}

/// Writes `entries` as CSV rows to `path`, replacing any previous file.
pub fn write_warnings(path: &Path, entries: &[SkippedEntry]) -> Result<(), ReportError> {
    let write_failed = |source: csv::Error| ReportError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(write_failed)?;

    for entry in entries {
        writer
            .write_record([
                entry.source.as_os_str().as_encoded_bytes(),
                entry.existing.as_os_str().as_encoded_bytes(),
            ])
            .map_err(write_failed)?;
    }

    writer
        .flush()
        .map_err(|e| write_failed(csv::Error::from(e)))?;

    Ok(())
}
