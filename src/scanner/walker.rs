//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for enumerating every regular
//! file below a root directory. Directory entries are visited sorted by file
//! name, so the enumeration order (and therefore the order of files inside a
//! duplicate group) is deterministic across runs.
//!
//! # Features
//!
//! - Root validation before any traversal (missing, not a directory, unreadable)
//! - Symbolic links are neither followed nor yielded
//! - Errors below the root are yielded as [`ScanError`] values rather than
//!   stopping iteration
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"));
//! let (files, errors) = walker.collect_files().unwrap();
//! println!("{} files, {} unreadable entries", files.len(), errors.len());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::ScanError;

/// Recursive enumerator of regular files.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            root: path.to_path_buf(),
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check that the root exists, is a directory, and can be listed.
    ///
    /// # Errors
    ///
    /// Returns the matching [`ScanError`] variant for each failure.
    pub fn validate_root(&self) -> Result<(), ScanError> {
        let metadata = fs::metadata(&self.root).map_err(|e| ScanError::from_io(&self.root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        fs::read_dir(&self.root).map_err(|e| ScanError::from_io(&self.root, e))?;
        Ok(())
    }

    /// Walk the directory tree, yielding the path of every regular file.
    ///
    /// Errors below the root are yielded as [`ScanError`] values; errors on
    /// the root itself are returned up front.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the root fails [`Walker::validate_root`].
    pub fn walk(&self) -> Result<impl Iterator<Item = Result<PathBuf, ScanError>> + '_, ScanError> {
        self.validate_root()?;

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();

        Ok(walk_dir
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        return None;
                    }
                    if !file_type.is_file() {
                        return None;
                    }
                    Some(Ok(entry.into_path()))
                }
                Err(e) => Some(Err(self.handle_walk_error(e))),
            }))
    }

    /// Walk the tree and split the results into files and non-fatal errors.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the root fails validation.
    pub fn collect_files(&self) -> Result<(Vec<PathBuf>, Vec<ScanError>), ScanError> {
        let mut files = Vec::new();
        let mut errors = Vec::new();

        for result in self.walk()? {
            match result {
                Ok(path) => files.push(path),
                Err(e) => errors.push(e),
            }
        }

        Ok((files, errors))
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let message = error.to_string();
        log::warn!("Walker error for {}: {}", path.display(), message);

        match error.into_io_error() {
            Some(io) => ScanError::from_io(&path, io),
            None => ScanError::Io {
                path,
                source: std::io::Error::other(message),
            },
        }
    }
}
