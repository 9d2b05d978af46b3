//! Walk orchestration.
//!
//! [`Classifier`] traverses the source tree in lexical pre-order and, for each
//! regular file:
//! 1. Resolves its category from the extension
//! 2. Drops it if it is below the category's size gate
//! 3. Hashes it and skips it if the content was already copied
//! 4. Picks `<dest>/<category>[/<year>/<year><month>]`
//! 5. Copies it under a collision-free name and records its digest
//!
//! Suppressed duplicates are written to `<dest>/warn.csv` once the walk ends.

use crate::config::ClassificationRules;
use crate::dedup::{DedupIndex, SkippedEntry, hash_file};
use crate::error::{ClassifyError, Result};
use crate::file_organizer::{FileOrganizer, Operation, OrganizeError};
use crate::report;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// What a run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Every copy, in walk order.
    pub operations: Vec<Operation>,
    /// Content duplicates that were not copied, in walk order.
    pub skipped: Vec<SkippedEntry>,
    /// Files dropped by a size gate.
    pub undersized: usize,
    /// Location of the duplicate report, if one was written.
    pub report_path: Option<PathBuf>,
}

impl RunSummary {
    /// Number of copied files per category.
    pub fn copied_by_category(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for op in &self.operations {
            *counts.entry(op.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn total_copied(&self) -> usize {
        self.operations.len()
    }
}

/// Outcome for a single regular file.
#[derive(Debug)]
enum Placement {
    Copied(Operation),
    Duplicate(SkippedEntry),
    Undersized,
}

/// Copies a source tree into category directories under a destination root.
pub struct Classifier<'a> {
    rules: &'a ClassificationRules,
    source: PathBuf,
    dest: PathBuf,
    index: DedupIndex,
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a ClassificationRules, source: &Path, dest: &Path) -> Self {
        Self {
            rules,
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
            index: DedupIndex::new(rules.dedup.scope()),
        }
    }

    /// Runs the classification.
    ///
    /// `on_file` is called with the path of every regular file before it is
    /// processed.
    ///
    /// # Errors
    ///
    /// The first I/O failure aborts the run. Files already copied are kept.
    pub fn run<F>(mut self, mut on_file: F) -> Result<RunSummary>
    where
        F: FnMut(&Path),
    {
        let metadata =
            fs::metadata(&self.source).map_err(|source| ClassifyError::SourceUnreadable {
                path: self.source.clone(),
                source,
            })?;
        if !metadata.is_dir() {
            return Err(ClassifyError::SourceNotDirectory(self.source.clone()));
        }

        FileOrganizer::ensure_dir(&self.dest)?;

        let mut summary = RunSummary::default();
        let pruned = self.nested_destination()?;
        let walker = WalkDir::new(&self.source)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| pruned.as_deref().is_none_or(|dir| entry.path() != dir));

        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(self.source.as_path()).to_path_buf();
                OrganizeError::WalkFailed {
                    path,
                    source: io::Error::from(err),
                }
            })?;

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if !file_type.is_file() {
                debug!(path = %entry.path().display(), "skipping non-regular file");
                continue;
            }

            on_file(entry.path());

            match self.place(&entry)? {
                Placement::Copied(op) => summary.operations.push(op),
                Placement::Duplicate(skipped) => summary.skipped.push(skipped),
                Placement::Undersized => summary.undersized += 1,
            }
        }

        if !summary.skipped.is_empty() {
            let path = report::report_path(&self.dest);
            report::write_warnings(&path, &summary.skipped)?;
            info!(
                report = %path.display(),
                duplicates = summary.skipped.len(),
                "wrote duplicate report"
            );
            summary.report_path = Some(path);
        }

        info!(
            copied = summary.total_copied(),
            duplicates = summary.skipped.len(),
            undersized = summary.undersized,
            "classification finished"
        );

        Ok(summary)
    }

    /// The destination as a walk path, if it lies strictly inside the source.
    ///
    /// Both roots are compared canonicalized, so `..` segments and linked
    /// ancestors do not hide the nesting. A destination equal to or above
    /// the source is walked normally.
    fn nested_destination(&self) -> Result<Option<PathBuf>> {
        let canonical = |path: &Path| {
            fs::canonicalize(path).map_err(|source| OrganizeError::StatFailed {
                path: path.to_path_buf(),
                source,
            })
        };
        let source = canonical(self.source.as_path())?;
        let dest = canonical(self.dest.as_path())?;

        Ok(match dest.strip_prefix(&source) {
            Ok(rel) if !rel.as_os_str().is_empty() => Some(self.source.join(rel)),
            _ => None,
        })
    }

    fn place(&mut self, entry: &DirEntry) -> Result<Placement> {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();
        let rules = self.rules;
        let category = rules.categories.category_for(&name);

        let metadata = entry.metadata().map_err(|err| OrganizeError::StatFailed {
            path: path.to_path_buf(),
            source: io::Error::from(err),
        })?;
        if rules.is_undersized(category, metadata.len()) {
            debug!(path = %path.display(), category, size = metadata.len(), "below size gate");
            return Ok(Placement::Undersized);
        }

        let digest = if rules.dedup.hashes(category) {
            let digest = hash_file(path).map_err(|source| OrganizeError::HashFailed {
                path: path.to_path_buf(),
                source,
            })?;
            if let Some(existing) = self.index.find(category, &digest) {
                debug!(
                    path = %path.display(),
                    existing = %existing.display(),
                    "duplicate content"
                );
                return Ok(Placement::Duplicate(SkippedEntry {
                    source: path.to_path_buf(),
                    existing: existing.to_path_buf(),
                }));
            }
            Some(digest)
        } else {
            None
        };

        let target_dir = self.target_dir(category, &name);
        let op = FileOrganizer::copy_to_category(path, &target_dir, category)?;
        debug!(
            from = %op.original_path.display(),
            to = %op.new_path.display(),
            category,
            "copied"
        );

        if let Some(digest) = digest {
            self.index.record(category, &digest, op.new_path.clone());
        }

        Ok(Placement::Copied(op))
    }

    /// `<dest>/<category>`, plus `<year>/<year><month>` for date-eligible
    /// categories whose file name carries a date.
    fn target_dir(&self, category: &str, name: &str) -> PathBuf {
        let dir = self.dest.join(category);
        if !self.rules.is_date_eligible(category) {
            return dir;
        }

        match self.rules.dates.resolve(name) {
            Some(bucket) => dir.join(bucket.year).join(bucket.year_month),
            None => dir,
        }
    }
}
