//! Two-phase duplicate detection.
//!
//! # Overview
//!
//! [`DuplicateDetector`] narrows a list of files down to confirmed duplicates:
//! 1. **Phase 1 - Partial hash**: digest the first 4 KiB of every file and
//!    keep only files whose partial digest is shared with another file
//! 2. **Phase 2 - Full hash**: digest the entire content of those candidates
//!    and keep only the groups of two or more
//!
//! Hashing within a phase runs on a bounded rayon pool, but results are
//! gathered back in input order before grouping, so a group always lists its
//! files in enumeration order.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::{DetectorConfig, DuplicateDetector};
//! use dupsweep::scanner::Walker;
//! use std::path::Path;
//!
//! let (files, _) = Walker::new(Path::new(".")).collect_files().unwrap();
//! let detector = DuplicateDetector::new(DetectorConfig::default().with_io_threads(2));
//! let (duplicates, stats) = detector.detect(&files).unwrap();
//!
//! println!("{} groups out of {} files", duplicates.len(), stats.input_files);
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{DuplicateSet, HashGroups};
use crate::progress::ProgressCallback;
use crate::scanner::{Digest, HashError, Hasher};

/// What to do when a file cannot be read during hashing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReadErrorPolicy {
    /// Stop detection on the first unreadable file.
    #[default]
    Abort,
    /// Log the file, leave it out of every group, and continue.
    Skip,
}

impl std::fmt::Display for ReadErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Configuration for the duplicate detector.
#[derive(Clone)]
pub struct DetectorConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Read-error policy applied in both phases.
    pub read_errors: ReadErrorPolicy,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("io_threads", &self.io_threads)
            .field("read_errors", &self.read_errors)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            read_errors: ReadErrorPolicy::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl DetectorConfig {
    /// Set the number of hashing threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the read-error policy.
    #[must_use]
    pub fn with_read_errors(mut self, policy: ReadErrorPolicy) -> Self {
        self.read_errors = policy;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Errors that stop detection.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    /// Detection was interrupted by the shutdown flag.
    #[error("Scan interrupted by user")]
    Interrupted,

    /// A file could not be hashed under [`ReadErrorPolicy::Abort`].
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Statistics from one detection run.
#[derive(Debug, Default)]
pub struct DetectionStats {
    /// Number of files handed to the detector
    pub input_files: usize,
    /// Files whose partial digest matched no other file
    pub unique_after_partial: usize,
    /// Files that went on to the full-content phase
    pub candidates: usize,
    /// Confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Confirmed duplicates, not counting the first file of each group
    pub duplicate_files: usize,
    /// Files left out under [`ReadErrorPolicy::Skip`]
    pub skipped: Vec<HashError>,
}

impl DetectionStats {
    /// Percentage of input files eliminated by the partial phase.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            return 0.0;
        }
        let eliminated = self.input_files.saturating_sub(self.candidates);
        (eliminated as f64 / self.input_files as f64) * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Partial,
    Full,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }

    fn is_full(self) -> bool {
        self == Self::Full
    }
}

/// Finds groups of files with identical content.
#[derive(Debug)]
pub struct DuplicateDetector {
    config: DetectorConfig,
    hasher: Hasher,
    /// Shared by both phases; `None` means hashing runs on the calling thread.
    pool: Option<rayon::ThreadPool>,
}

impl DuplicateDetector {
    /// Create a detector hashing with the default algorithm.
    ///
    /// The I/O pool is sized from [`DetectorConfig::io_threads`] once and
    /// reused by every [`detect`](Self::detect) call.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(config.io_threads.max(1))
            .thread_name(|i| format!("dupsweep-io-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!("Failed to create hashing thread pool ({e}), hashing sequentially");
                None
            }
        };

        Self {
            config,
            hasher: Hasher::new(),
            pool,
        }
    }

    /// Create a detector with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DetectorConfig::default())
    }

    /// Use a specific hasher (and therefore digest algorithm).
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Run both phases over `files`.
    ///
    /// Files are grouped in the order given; duplicate groups appear in the
    /// order their full digest was first seen.
    ///
    /// # Errors
    ///
    /// - [`DetectError::Interrupted`] if the shutdown flag was raised
    /// - [`DetectError::Hash`] for the first unreadable file (in input order)
    ///   under [`ReadErrorPolicy::Abort`]
    pub fn detect(&self, files: &[PathBuf]) -> Result<(DuplicateSet, DetectionStats), DetectError> {
        let mut stats = DetectionStats {
            input_files: files.len(),
            ..Default::default()
        };

        if files.is_empty() {
            log::debug!("No files to compare");
            return Ok((DuplicateSet::new(), stats));
        }

        log::info!("Phase 1: Computing partial hashes for {} files", files.len());
        let partial_groups = self.hash_phase(Phase::Partial, files, &mut stats)?;
        let candidates = partial_groups.candidates();
        stats.unique_after_partial = partial_groups.unique_count();
        stats.candidates = candidates.len();

        log::info!(
            "Phase 1 complete: {} files → {} candidates ({:.1}% eliminated)",
            stats.input_files,
            stats.candidates,
            stats.elimination_rate()
        );

        if candidates.is_empty() {
            log::info!("No partial hash matches, skipping full hashing");
            return Ok((DuplicateSet::new(), stats));
        }

        log::info!("Phase 2: Computing full hashes for {} files", candidates.len());
        let full_groups = self.hash_phase(Phase::Full, &candidates, &mut stats)?;
        let duplicates = full_groups.into_duplicates();
        stats.duplicate_groups = duplicates.len();
        stats.duplicate_files = duplicates.redundant_count();

        log::info!(
            "Phase 2 complete: {} candidates → {} duplicate groups ({} redundant files)",
            stats.candidates,
            stats.duplicate_groups,
            stats.duplicate_files
        );

        Ok((duplicates, stats))
    }

    /// Digest every file for one phase and group the results in input order.
    fn hash_phase(
        &self,
        phase: Phase,
        files: &[PathBuf],
        stats: &mut DetectionStats,
    ) -> Result<HashGroups, DetectError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(phase.name(), files.len());
        }

        let results = self.digest_all(phase, files);

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(phase.name());
        }

        if self.config.is_shutdown_requested() {
            log::info!("Phase {}: Interrupted by shutdown signal", phase.name());
            return Err(DetectError::Interrupted);
        }

        let mut groups = HashGroups::new();
        for (path, result) in files.iter().zip(results) {
            match result {
                None => return Err(DetectError::Interrupted),
                Some(Ok(digest)) => groups.insert(digest, path.clone()),
                Some(Err(e)) => match self.config.read_errors {
                    ReadErrorPolicy::Abort => {
                        log::error!("Failed to hash {}: {}", path.display(), e);
                        return Err(DetectError::Hash(e));
                    }
                    ReadErrorPolicy::Skip => {
                        log::warn!("Skipping unreadable file {}: {}", path.display(), e);
                        stats.skipped.push(e);
                    }
                },
            }
        }

        log::debug!(
            "Phase {}: {} files in {} distinct digests",
            phase.name(),
            groups.file_count(),
            groups.len()
        );

        Ok(groups)
    }

    /// Digest files on the I/O pool; `None` marks a file skipped by shutdown.
    fn digest_all(&self, phase: Phase, files: &[PathBuf]) -> Vec<Option<Result<Digest, HashError>>> {
        let processed = AtomicUsize::new(0);
        let digest_one = |path: &PathBuf| {
            if self.config.is_shutdown_requested() {
                return None;
            }
            let result = self.hasher.digest(path, phase.is_full());
            if let Some(ref callback) = self.config.progress_callback {
                let current = processed.fetch_add(1, Ordering::Relaxed) + 1;
                callback.on_progress(current, path.to_string_lossy().as_ref());
            }
            Some(result)
        };

        match self.pool {
            Some(ref pool) => pool.install(|| files.par_iter().map(digest_one).collect()),
            None => files.iter().map(digest_one).collect(),
        }
    }
}
