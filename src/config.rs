//! Classification configuration.
//!
//! This module loads the YAML configuration that drives a run and compiles it
//! into [`ClassificationRules`]:
//! - Extension to category mapping with a default category
//! - Ordered date patterns for year/month buckets
//! - Categories eligible for date buckets
//! - Minimum file sizes per category
//! - The content deduplication policy
//!
//! # Configuration File Format
//!
//! ```yaml
//! categories:
//!   - name: images
//!     extensions: [jpg, jpeg, png]
//!   - name: documents
//!     extensions: [txt, log]
//! default_category: others
//! date_patterns:
//!   - '(?P<year>\d{4})-(?P<month>\d{2})-\d{2}'
//! date_categories: [images, movies]
//! min_file_size:
//!   images: 1048576
//! dedup:
//!   enabled: true
//!   scope: per_category      # or global
//!   categories: [images, movies]
//! ```
//!
//! Without an explicit file, the default configuration embedded at build time
//! is used.

use crate::date_resolver::DateResolver;
use crate::dedup::{DedupPolicy, DedupScope};
use crate::file_category::{Category, CategoryResolver};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration used when no `--config` file is given.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.yaml");

/// Minimum size for images unless configured otherwise (1 MiB).
pub const DEFAULT_MIN_IMAGE_SIZE: u64 = 1 << 20;

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// IO error while reading configuration.
    #[error("IO error reading configuration {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid YAML syntax or structure.
    #[error("Invalid configuration in {origin}: {source}")]
    ConfigInvalid {
        /// The file path, or "embedded default".
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A date pattern that failed to compile.
    #[error("Invalid date pattern '{pattern}': {source}")]
    InvalidRegexPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Root of the YAML configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Ordered categories with their extensions.
    #[serde(default)]
    pub categories: Vec<Category>,

    /// Category for files with no or unknown extension. Blank means "others".
    #[serde(default)]
    pub default_category: Option<String>,

    /// Regular expressions tried in order against file names.
    #[serde(default)]
    pub date_patterns: Vec<String>,

    /// Categories that get `<year>/<year><month>` subfolders.
    #[serde(default = "default_date_categories")]
    pub date_categories: Vec<String>,

    /// Files smaller than this many bytes are skipped, per category.
    #[serde(default = "default_min_file_size")]
    pub min_file_size: BTreeMap<String, u64>,

    /// Content deduplication settings.
    #[serde(default)]
    pub dedup: DedupSettings,
}

/// Deduplication section of the configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DedupSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub scope: DedupScope,

    /// Hash-eligible categories; absent means all of them.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scope: DedupScope::Global,
            categories: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_date_categories() -> Vec<String> {
    vec!["images".to_string(), "movies".to_string()]
}

fn default_min_file_size() -> BTreeMap<String, u64> {
    BTreeMap::from([("images".to_string(), DEFAULT_MIN_IMAGE_SIZE)])
}

impl ClassifierConfig {
    /// Load configuration from `config_path`, or the embedded default.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or not valid YAML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Self::embedded(),
        }
    }

    /// Parse the configuration embedded at build time.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml_str(DEFAULT_CONFIG, "embedded default")
    }

    /// Parse configuration from a YAML string. `origin` names the source in errors.
    pub fn from_yaml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::ConfigInvalid {
            origin: origin.to_string(),
            source,
        })
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&content, &path.display().to_string())
    }

    /// Compile configuration into the immutable rules used for a run.
    ///
    /// # Errors
    ///
    /// Returns an error if any date pattern is not a valid regex.
    pub fn compile(self) -> Result<ClassificationRules, ConfigError> {
        ClassificationRules::new(self)
    }
}

/// Compiled, read-only classification rules.
#[derive(Debug, Clone)]
pub struct ClassificationRules {
    pub categories: CategoryResolver,
    pub dates: DateResolver,
    pub dedup: DedupPolicy,
    date_categories: HashSet<String>,
    min_file_size: HashMap<String, u64>,
}

impl ClassificationRules {
    fn new(config: ClassifierConfig) -> Result<Self, ConfigError> {
        let patterns = config
            .date_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let dedup = if config.dedup.enabled {
            DedupPolicy::new(
                config.dedup.scope,
                config
                    .dedup
                    .categories
                    .map(|names| names.into_iter().collect()),
            )
        } else {
            DedupPolicy::disabled()
        };

        Ok(Self {
            categories: CategoryResolver::from_categories(
                &config.categories,
                config.default_category.as_deref().unwrap_or_default(),
            ),
            dates: DateResolver::new(patterns),
            dedup,
            date_categories: config.date_categories.into_iter().collect(),
            min_file_size: config.min_file_size.into_iter().collect(),
        })
    }

    /// Returns true if files of `category` get date subfolders.
    pub fn is_date_eligible(&self, category: &str) -> bool {
        self.date_categories.contains(category)
    }

    /// Returns true if a file of `category` with `size` bytes is below its gate.
    pub fn is_undersized(&self, category: &str, size: u64) -> bool {
        self.min_file_size
            .get(category)
            .is_some_and(|min| size < *min)
    }
}
