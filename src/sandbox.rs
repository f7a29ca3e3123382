//! # Sandbox Root
//!
//! The sandbox root is the ownership boundary for everything the pipeline
//! creates. All stage paths are given relative to it and resolved through
//! [`SandboxRoot::resolve`], which rejects anything that could land outside:
//!
//! - absolute paths
//! - `..` components
//! - root or drive-prefix components
//!
//! The check is lexical. Symlinks inside the root are not followed or
//! inspected; the archive decoder refuses to create them.
//!
//! ## Atomic Writes
//!
//! Documents are written via a temp file + rename pattern:
//! 1. Write to `<path>.tmp.<uuid>`
//! 2. Rename to `<path>`
//!
//! A crash mid-write leaves the previous document (or nothing) in place,
//! never a truncated one. Re-running always replaces the destination.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Absolute root directory owned by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRoot {
    path: PathBuf,
}

impl SandboxRoot {
    /// Creates a sandbox root.
    ///
    /// The directory does not need to exist yet; stages create what they
    /// need. The path must be absolute.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(Error::InvalidSandboxRoot {
                path,
                reason: "must be an absolute path".to_string(),
            });
        }
        Ok(Self { path })
    }

    /// Returns the root directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves a root-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathOutsideSandbox`] if `relative` is absolute or
    /// has a component that could step outside the root.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let relative = relative.as_ref();
        validate_relative(relative)?;
        Ok(self.path.join(relative))
    }

    /// Creates a root-relative directory and all of its parents.
    ///
    /// An existing directory is success.
    pub fn ensure_dir(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = self.resolve(relative)?;
        create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Writes `contents` to a root-relative file, replacing it atomically.
    ///
    /// Parent directories are created as needed. Any failure is reported as
    /// [`Error::WriteFailed`] carrying the destination path.
    pub fn write_file(&self, relative: impl AsRef<Path>, contents: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(relative)?;
        write_atomic(&path, contents).map_err(|reason| Error::WriteFailed {
            path: path.clone(),
            reason,
        })?;
        Ok(path)
    }
}

/// Creates `dir` recursively, treating "already exists" as success.
pub(crate) fn create_dir_all(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::DirectoryCreateFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Rejects paths that are absolute or contain non-normal components.
fn validate_relative(path: &Path) -> Result<()> {
    if path.is_absolute() {
        return Err(Error::PathOutsideSandbox {
            path: path.to_path_buf(),
        });
    }

    for component in path.components() {
        if matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        ) {
            return Err(Error::PathOutsideSandbox {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::result::Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
    }

    // Unique temp name so two writers never share a partial file.
    let temp_name = format!("tmp.{}", uuid::Uuid::now_v7());
    let temp_path = path.with_extension(temp_name);

    fs::write(&temp_path, contents).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        e.to_string()
    })?;
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        e.to_string()
    })?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}
