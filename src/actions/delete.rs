//! Deletion of redundant copies.
//!
//! # Overview
//!
//! This module removes every member of a duplicate group except the first
//! (the keeper). Files are either deleted permanently (the default) or moved
//! to the system trash through the `trash` crate.
//!
//! # Safety
//!
//! The keeper of each group is never touched, so at least one copy of every
//! duplicated content survives.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::delete::{delete_file, RemovalMode};
//! use std::path::Path;
//!
//! match delete_file(Path::new("/path/to/duplicate.txt"), RemovalMode::Trash) {
//!     Ok(result) => println!("Freed {} bytes", result.size),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BatchResult, Processed};
use crate::duplicates::DuplicateSet;
use crate::progress::ProgressCallback;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File path
        path: PathBuf,
        /// Error reported by the trash backend
        message: String,
    },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed {
        /// File path
        path: PathBuf,
        /// Error reported by the file system
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// How files are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMode {
    /// Remove from the file system.
    #[default]
    Permanent,
    /// Move to the system trash (recoverable).
    Trash,
}

/// Result of a successful deletion.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// How the file was removed.
    pub mode: RemovalMode,
}

fn file_size(path: &Path) -> Result<u64, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    Ok(metadata.len())
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be accessed
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    trash::delete(path).map_err(|e| DeleteError::TrashFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    log::debug!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        mode: RemovalMode::Trash,
    })
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be accessed
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    fs::remove_file(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        _ => DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;

    log::debug!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        mode: RemovalMode::Permanent,
    })
}

/// Delete a single file with the given removal mode.
///
/// # Errors
///
/// See [`permanent_delete`] and [`delete_to_trash`].
pub fn delete_file(path: &Path, mode: RemovalMode) -> Result<DeleteResult, DeleteError> {
    match mode {
        RemovalMode::Permanent => permanent_delete(path),
        RemovalMode::Trash => delete_to_trash(path),
    }
}

/// Delete every member of every group except the first.
///
/// Failures are recorded and the remaining files are still processed.
#[must_use]
pub fn delete_duplicates(
    set: &DuplicateSet,
    mode: RemovalMode,
    progress: Option<&dyn ProgressCallback>,
) -> BatchResult {
    let mut result = BatchResult::default();
    let total = set.redundant_count();

    if let Some(cb) = progress {
        cb.on_phase_start("delete", total);
    }

    let mut index = 0;
    for group in set {
        if let Some(keeper) = group.keeper() {
            log::debug!("Keeping {} ({})", keeper.display(), group.hash_hex());
        }

        for path in group.redundant() {
            index += 1;
            if let Some(cb) = progress {
                cb.on_progress(index, path.to_string_lossy().as_ref());
            }

            match delete_file(path, mode) {
                Ok(deleted) => result.record_processed(Processed {
                    path: deleted.path,
                    size: deleted.size,
                    destination: None,
                }),
                Err(DeleteError::NotFound(_)) => result.record_missing(path),
                Err(e) => result.record_failure(path, e.to_string()),
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_phase_end("delete");
    }

    log::info!("{}", result.summary("Deleted"));
    result
}
