//! Relocation of duplicate groups into per-digest folders.
//!
//! # Overview
//!
//! The Move action creates one fresh destination folder and, below it, one
//! subfolder per group named by the group's hex digest. Every member of the
//! group is moved there under its original file name:
//!
//! ```text
//! <root>/<destination>/<hex-digest>/<file-name>
//! ```
//!
//! Existing files are never overwritten. A rename that crosses file systems
//! falls back to copy and remove.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::relocate::{create_destination, move_duplicates};
//! use dupsweep::duplicates::DuplicateSet;
//! use std::path::Path;
//!
//! let set = DuplicateSet::new();
//! let destination = Path::new("/data/2024-01-31_120000");
//! create_destination(destination).unwrap();
//! let batch = move_duplicates(&set, destination, None);
//! println!("{}", batch.summary("Moved"));
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{ActionError, BatchResult, Processed};
use crate::duplicates::DuplicateSet;
use crate::progress::ProgressCallback;

/// Format of the timestamped destination folder name.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Error type for a single file move.
#[derive(Debug, Error)]
pub enum MoveError {
    /// Source file was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Source path has no file name component.
    #[error("no file name: {0}")]
    NoFileName(PathBuf),

    /// A file with the same name is already in the target folder.
    #[error("target already exists: {0}")]
    DestinationExists(PathBuf),

    /// The copy succeeded but the source could not be removed.
    #[error("copied {path} but could not remove the original: {source}")]
    RemoveSource {
        /// Source path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error moving {path}: {source}")]
    Io {
        /// Source path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Destination folder name for the current local time.
#[must_use]
pub fn timestamp_folder() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Create the destination folder; it must not exist yet.
///
/// # Errors
///
/// - [`ActionError::DestinationExists`] if anything is already at `path`
/// - [`ActionError::CreateDestination`] for any other creation failure
pub fn create_destination(path: &Path) -> Result<(), ActionError> {
    if path.symlink_metadata().is_ok() {
        return Err(ActionError::DestinationExists(path.to_path_buf()));
    }

    match fs::create_dir(path) {
        Ok(()) => {
            log::debug!("Created destination {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(ActionError::DestinationExists(path.to_path_buf()))
        }
        Err(source) => Err(ActionError::CreateDestination {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Move `source` into `target_dir`, keeping its file name.
///
/// Returns the new location and the size moved.
///
/// # Errors
///
/// - `NotFound` if the source no longer exists
/// - `DestinationExists` if the target name is taken
/// - `RemoveSource` if a cross-device copy could not remove the original
/// - `Io` for any other failure
pub fn move_file(source: &Path, target_dir: &Path) -> Result<(PathBuf, u64), MoveError> {
    let io_err = |e: io::Error| match e.kind() {
        io::ErrorKind::NotFound => MoveError::NotFound(source.to_path_buf()),
        _ => MoveError::Io {
            path: source.to_path_buf(),
            source: e,
        },
    };

    let size = fs::symlink_metadata(source).map_err(io_err)?.len();
    let name = source
        .file_name()
        .ok_or_else(|| MoveError::NoFileName(source.to_path_buf()))?;
    let target = target_dir.join(name);

    if target.symlink_metadata().is_ok() {
        return Err(MoveError::DestinationExists(target));
    }

    match fs::rename(source, &target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!(
                "Rename across devices, copying {} to {}",
                source.display(),
                target.display()
            );
            copy_then_remove(source, &target)?;
        }
        Err(e) => return Err(io_err(e)),
    }

    log::trace!("Moved {} to {}", source.display(), target.display());
    Ok((target, size))
}

/// Remove a copy left behind by a failed cross-device move.
fn discard_copy(target: &Path) {
    match fs::remove_file(target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Could not remove partial copy {}: {}", target.display(), e),
    }
}

fn copy_then_remove(source: &Path, target: &Path) -> Result<(), MoveError> {
    fs::copy(source, target).map_err(|e| {
        discard_copy(target);
        MoveError::Io {
            path: source.to_path_buf(),
            source: e,
        }
    })?;

    if let Err(e) = fs::remove_file(source) {
        discard_copy(target);
        return Err(MoveError::RemoveSource {
            path: source.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

/// Move every member of every group under `destination`.
///
/// `destination` must already exist (see [`create_destination`]). A group
/// whose subfolder cannot be created records all its members as failed; all
/// other groups are still processed.
#[must_use]
pub fn move_duplicates(
    set: &DuplicateSet,
    destination: &Path,
    progress: Option<&dyn ProgressCallback>,
) -> BatchResult {
    let mut result = BatchResult::default();
    let total = set.file_count();
    let mut current = 0;

    if let Some(cb) = progress {
        cb.on_phase_start("move", total);
    }

    for group in set {
        let group_dir = destination.join(group.hash_hex());

        if let Err(e) = fs::create_dir_all(&group_dir) {
            let message = format!("cannot create {}: {}", group_dir.display(), e);
            for path in &group.files {
                current += 1;
                result.record_failure(path, message.clone());
            }
            if let Some(cb) = progress {
                cb.on_progress(current, group_dir.to_string_lossy().as_ref());
            }
            continue;
        }

        for path in &group.files {
            current += 1;
            if let Some(cb) = progress {
                cb.on_progress(current, path.to_string_lossy().as_ref());
            }

            match move_file(path, &group_dir) {
                Ok((target, size)) => result.record_processed(Processed {
                    path: path.clone(),
                    size,
                    destination: Some(target),
                }),
                Err(MoveError::NotFound(_)) => result.record_missing(path),
                Err(e) => result.record_failure(path, e.to_string()),
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_phase_end("move");
    }

    log::info!("{} to {}", result.summary("Moved"), destination.display());
    result
}
