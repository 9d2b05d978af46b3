//! Top-level error type for a classification run.
//!
//! Every variant is fatal: the run stops at the first error and whatever was
//! already copied stays in place.

use crate::config::ConfigError;
use crate::file_organizer::OrganizeError;
use crate::report::ReportError;
use std::path::PathBuf;
use thiserror::Error;

pub const USAGE: &str = "usage: classifier [--config|-c <path>] <src-abs-dir> <dest-abs-dir>";

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Invalid invocation, detected before touching the filesystem.
    #[error("{0}; {usage}", usage = USAGE)]
    Usage(String),

    #[error("Failed to read source {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Organize(#[from] OrganizeError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

pub type Result<T> = std::result::Result<T, ClassifyError>;
