//! Content-hash deduplication.
//!
//! Files in hash-eligible categories are digested with SHA-256. The first
//! file seen with a given digest is copied and its destination recorded in
//! the [`DedupIndex`]; later files with the same digest in the same scope are
//! skipped and reported as [`SkippedEntry`] rows.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Which files are compared against each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
    /// One index shared by every category.
    #[default]
    Global,
    /// An independent index per category.
    PerCategory,
}

/// Which categories are hashed, and how their digests are scoped.
#[derive(Debug, Clone)]
pub struct DedupPolicy {
    enabled: bool,
    scope: DedupScope,
    /// `None` means every category is hash-eligible.
    categories: Option<HashSet<String>>,
}

impl DedupPolicy {
    pub fn new(scope: DedupScope, categories: Option<HashSet<String>>) -> Self {
        Self {
            enabled: true,
            scope,
            categories,
        }
    }

    /// A policy that never hashes.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            scope: DedupScope::Global,
            categories: None,
        }
    }

    pub fn scope(&self) -> DedupScope {
        self.scope
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true if files of `category` should be hashed.
    pub fn hashes(&self, category: &str) -> bool {
        self.enabled
            && self
                .categories
                .as_ref()
                .is_none_or(|set| set.contains(category))
    }
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self::new(DedupScope::Global, None)
    }
}

/// A file suppressed because its content was already copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Path of the suppressed file in the source tree.
    pub source: PathBuf,
    /// Destination path of the copy that was kept.
    pub existing: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    scope: Option<String>,
    digest: String,
}

/// Digest to first destination path, within the configured scope.
///
/// Grows monotonically for the duration of a run.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    scope: DedupScope,
    seen: HashMap<DedupKey, PathBuf>,
}

impl DedupIndex {
    pub fn new(scope: DedupScope) -> Self {
        Self {
            scope,
            seen: HashMap::new(),
        }
    }

    fn key(&self, category: &str, digest: &str) -> DedupKey {
        let scope = match self.scope {
            DedupScope::Global => None,
            DedupScope::PerCategory => Some(category.to_string()),
        };
        DedupKey {
            scope,
            digest: digest.to_string(),
        }
    }

    /// Returns the path already recorded for `digest` in this scope.
    pub fn find(&self, category: &str, digest: &str) -> Option<&Path> {
        self.seen
            .get(&self.key(category, digest))
            .map(PathBuf::as_path)
    }

    /// Records `path` for `digest`. An earlier record is never replaced.
    pub fn record(&mut self, category: &str, digest: &str, path: PathBuf) {
        let key = self.key(category, digest);
        self.seen.entry(key).or_insert(path);
    }

    /// Looks up `digest` and records `candidate` if it is new.
    ///
    /// Returns the previously recorded path when `digest` is a duplicate.
    pub fn check_and_record(
        &mut self,
        category: &str,
        digest: &str,
        candidate: &Path,
    ) -> Option<PathBuf> {
        if let Some(existing) = self.find(category, digest) {
            return Some(existing.to_path_buf());
        }
        self.record(category, digest, candidate.to_path_buf());
        None
    }

    /// Number of distinct digests recorded.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Computes the SHA-256 digest of a file's contents as lowercase hex.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
