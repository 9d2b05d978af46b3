//! File placement into category directories.
//!
//! This module provides the filesystem side of a classification run: creating
//! target directories, choosing a collision-free destination name and copying
//! file contents and permissions.
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Highest numeric suffix tried before giving up on a name.
pub const MAX_NAME_SUFFIX: u32 = 1_000_000;

/// Represents a single completed copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The path of the file in the source tree.
    pub original_path: PathBuf,
    /// The path the file was copied to.
    pub new_path: PathBuf,
    /// The category the file was placed in.
    pub category: String,
}

/// Errors that can occur while placing files.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to stat a source entry or a destination candidate.
    #[error("Failed to stat {}: {source}", .path.display())]
    StatFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to copy a file to its destination.
    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    FileCopyFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read a file while computing its content hash.
    #[error("Failed to hash {}: {source}", .path.display())]
    HashFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to traverse the source tree.
    #[error("Failed to walk {}: {source}", .path.display())]
    WalkFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Every numbered variant of a name is already taken.
    #[error("No free name for {name} in {} after {} attempts", .dir.display(), MAX_NAME_SUFFIX)]
    NameSpaceExhausted { dir: PathBuf, name: String },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Places files into target directories under the destination root.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Creates `dir` and any missing parents. Existing directories are fine.
    pub fn ensure_dir(dir: &Path) -> OrganizeResult<()> {
        fs::create_dir_all(dir).map_err(|source| OrganizeError::DirectoryCreationFailed {
            path: dir.to_path_buf(),
            source,
        })
    }

    /// Returns a path in `dir` for `name` that does not exist yet.
    ///
    /// If `dir/name` is taken, `base_1.ext`, `base_2.ext`, ... are probed in
    /// order, where `.ext` starts at the last '.' of `name`. The name is kept
    /// as raw OS bytes, so non-UTF-8 names survive unchanged.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use classifier::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// // With images/alpha.jpg already present this yields images/alpha_1.jpg.
    /// let path = FileOrganizer::unique_path(Path::new("/dest/images"), "alpha.jpg")?;
    /// # Ok::<(), classifier::file_organizer::OrganizeError>(())
    /// ```
    pub fn unique_path(dir: &Path, name: impl AsRef<OsStr>) -> OrganizeResult<PathBuf> {
        let name = name.as_ref();
        let target = dir.join(name);
        if !Self::exists(&target)? {
            return Ok(target);
        }

        for i in 1..=MAX_NAME_SUFFIX {
            let candidate = dir.join(numbered_name(name, i));
            if !Self::exists(&candidate)? {
                return Ok(candidate);
            }
        }

        Err(OrganizeError::NameSpaceExhausted {
            dir: dir.to_path_buf(),
            name: name.to_string_lossy().into_owned(),
        })
    }

    /// Whether anything, including a dangling link, occupies `path`.
    fn exists(path: &Path) -> OrganizeResult<bool> {
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(OrganizeError::StatFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Copies `file_path` into `target_dir` under a collision-free name.
    ///
    /// The directory is created if needed. Contents and permission bits are
    /// copied; the source is left untouched.
    pub fn copy_to_category(
        file_path: &Path,
        target_dir: &Path,
        category: &str,
    ) -> OrganizeResult<Operation> {
        Self::ensure_dir(target_dir)?;

        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileCopyFailure {
                from: file_path.to_path_buf(),
                to: target_dir.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        let destination_path = Self::unique_path(target_dir, file_name)?;

        fs::copy(file_path, &destination_path).map_err(|source| OrganizeError::FileCopyFailure {
            from: file_path.to_path_buf(),
            to: destination_path.clone(),
            source,
        })?;

        Ok(Operation {
            original_path: file_path.to_path_buf(),
            new_path: destination_path,
            category: category.to_string(),
        })
    }
}

/// `name` with `_n` inserted before its last '.', or appended if it has none.
fn numbered_name(name: &OsStr, n: u32) -> OsString {
    let path = Path::new(name);
    let mut numbered = OsString::with_capacity(name.len() + 8);
    match path.extension() {
        Some(ext) => {
            numbered.push(path.file_stem().unwrap_or_default());
            numbered.push(format!("_{n}."));
            numbered.push(ext);
        }
        // ".profile" has no extension for `Path`, but its last '.' is the first byte.
        None if name.as_encoded_bytes().first() == Some(&b'.') => {
            numbered.push(format!("_{n}"));
            numbered.push(name);
        }
        None => {
            numbered.push(name);
            numbered.push(format!("_{n}"));
        }
    }
    numbered
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unique_path_free_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = FileOrganizer::unique_path(temp_dir.path(), "alpha.jpg").unwrap();
        assert_eq!(path, temp_dir.path().join("alpha.jpg"));
    }

    #[test]
    fn test_unique_path_appends_suffix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        fs::write(dir.join("alpha.jpg"), "a").unwrap();
        fs::write(dir.join("alpha_1.jpg"), "b").unwrap();

        let path = FileOrganizer::unique_path(dir, "alpha.jpg").unwrap();
        assert_eq!(path, dir.join("alpha_2.jpg"));
    }

    #[test]
    fn test_unique_path_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        fs::write(dir.join("echo"), "a").unwrap();

        let path = FileOrganizer::unique_path(dir, "echo").unwrap();
        assert_eq!(path, dir.join("echo_1"));
    }

    #[test]
    fn test_unique_path_splits_at_last_dot() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        fs::write(dir.join("backup.tar.gz"), "a").unwrap();
        fs::write(dir.join(".profile"), "a").unwrap();

        assert_eq!(
            FileOrganizer::unique_path(dir, "backup.tar.gz").unwrap(),
            dir.join("backup.tar_1.gz")
        );
        assert_eq!(
            FileOrganizer::unique_path(dir, ".profile").unwrap(),
            dir.join("_1.profile")
        );
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name(OsStr::new("alpha.jpg"), 3), "alpha_3.jpg");
        assert_eq!(numbered_name(OsStr::new("name."), 1), "name_1.");
        assert_eq!(numbered_name(OsStr::new(".profile.bak"), 1), ".profile_1.bak");
        assert_eq!(numbered_name(OsStr::new("._foo"), 2), "_2._foo");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_preserved() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let first = OsStr::from_bytes(b"caf\xe9.txt");
        let second = OsStr::from_bytes(b"caf\xe8.txt");
        fs::write(base_path.join(first), "e9").unwrap();
        fs::write(base_path.join(second), "e8").unwrap();

        let target = base_path.join("documents");
        let a = FileOrganizer::copy_to_category(&base_path.join(first), &target, "documents")
            .unwrap();
        let b = FileOrganizer::copy_to_category(&base_path.join(second), &target, "documents")
            .unwrap();

        // Names differing only in invalid bytes stay distinct.
        assert_eq!(a.new_path, target.join(first));
        assert_eq!(b.new_path, target.join(second));

        let c = FileOrganizer::unique_path(&target, first).unwrap();
        assert_eq!(c, target.join(OsStr::from_bytes(b"caf\xe9_1.txt")));
    }

    #[test]
    fn test_copy_to_category_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");

        let target = base_path.join("dest").join("documents");
        let op = FileOrganizer::copy_to_category(&file_path, &target, "documents")
            .expect("Failed to copy file");

        assert!(target.is_dir());
        assert_eq!(op.new_path, target.join("test.txt"));
        assert_eq!(op.category, "documents");
        assert_eq!(fs::read_to_string(&op.new_path).unwrap(), "test content");
        // The source stays in place.
        assert!(file_path.exists());
    }

    #[test]
    fn test_copy_to_category_never_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let target = base_path.join("images");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("alpha.jpg"), "existing").unwrap();

        let file_path = base_path.join("alpha.jpg");
        fs::write(&file_path, "new").unwrap();

        let op = FileOrganizer::copy_to_category(&file_path, &target, "images").unwrap();
        assert_eq!(op.new_path, target.join("alpha_1.jpg"));
        assert_eq!(fs::read_to_string(target.join("alpha.jpg")).unwrap(), "existing");
        assert_eq!(fs::read_to_string(&op.new_path).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("run.sh");
        fs::write(&file_path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o750)).unwrap();

        let op = FileOrganizer::copy_to_category(&file_path, &temp_dir.path().join("others"), "others")
            .unwrap();
        let mode = fs::metadata(&op.new_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = FileOrganizer::copy_to_category(
            &temp_dir.path().join("missing.txt"),
            &temp_dir.path().join("documents"),
            "documents",
        );
        assert!(matches!(result, Err(OrganizeError::FileCopyFailure { .. })));
    }
}
