//! classifier - copy a directory tree into category folders
//!
//! This library walks a source tree, buckets every regular file into a
//! category by extension, optionally sub-buckets it by a date found in its
//! name, and copies it under a destination root. Files whose content was
//! already copied are skipped and listed in a CSV report. Categories, date
//! patterns and dedup rules come from a YAML configuration.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod date_resolver;
pub mod dedup;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod report;

pub use classifier::{Classifier, RunSummary};
pub use config::{ClassificationRules, ClassifierConfig, ConfigError};
pub use date_resolver::{DateBucket, DateResolver};
pub use dedup::{DedupIndex, DedupPolicy, DedupScope, SkippedEntry};
pub use error::ClassifyError;
pub use file_category::{Category, CategoryResolver};
pub use file_organizer::{FileOrganizer, Operation, OrganizeError};
