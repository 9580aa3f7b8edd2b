//! File actions module.
//!
//! This module provides the dispositions applied to a [`DuplicateSet`]:
//! - List: print every group to an output stream
//! - Report: write the same listing to a plain-text file
//! - Move: relocate every member of every group under a fresh folder
//! - Delete: remove every member except the first of each group
//!
//! # Fault tolerance
//!
//! List and Report fail as a whole if their output cannot be written. Move
//! and Delete treat each file independently: a failure is recorded in the
//! [`BatchResult`] and the remaining files are still processed. A file that
//! disappeared since detection is recorded as *missing*, which is not a
//! failure.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::{apply, Action, ActionContext};
//! use dupsweep::duplicates::DuplicateSet;
//! use std::path::Path;
//!
//! let set = DuplicateSet::new();
//! let mut stdout = std::io::stdout();
//! let mut ctx = ActionContext::new(Path::new("/data"), &mut stdout);
//! let outcome = apply(Action::List, &set, &mut ctx).unwrap();
//! println!("{}", outcome.summary());
//! ```

pub mod delete;
pub mod relocate;
pub mod report;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytesize::ByteSize;

use crate::duplicates::DuplicateSet;
use crate::progress::ProgressCallback;

// Re-export commonly used types
pub use delete::{
    delete_duplicates, delete_file, delete_to_trash, permanent_delete, DeleteError, RemovalMode,
};
pub use relocate::{create_destination, move_duplicates, move_file, timestamp_folder, MoveError};
pub use report::{list, save_report, write_groups, DEFAULT_REPORT_FILE};

/// The disposition to apply to the detected duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Print groups to the output stream.
    List,
    /// Write groups to the report file.
    Report,
    /// Relocate every member into per-digest folders.
    Move,
    /// Remove every member except the first of each group.
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Report => write!(f, "file"),
            Self::Move => write!(f, "move"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Fatal errors raised by an action.
#[derive(thiserror::Error, Debug)]
pub enum ActionError {
    /// Writing the listing to the output stream failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),

    /// The report file could not be created or written.
    #[error("failed to write report {path}: {source}")]
    Report {
        /// Report path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The move destination folder is already present.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// The move destination folder could not be created.
    #[error("failed to create destination {path}: {source}")]
    CreateDestination {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// A file handled successfully by a batch action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// Original location
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// New location, for moves
    pub destination: Option<PathBuf>,
}

/// Per-file outcomes of Move or Delete.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Files handled successfully.
    pub processed: Vec<Processed>,
    /// Files that no longer existed.
    pub missing: Vec<PathBuf>,
    /// Failed files with their errors.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes moved or freed.
    pub bytes: u64,
}

impl BatchResult {
    pub(crate) fn record_processed(&mut self, processed: Processed) {
        self.bytes += processed.size;
        self.processed.push(processed);
    }

    pub(crate) fn record_missing(&mut self, path: &Path) {
        log::warn!("File already gone: {}", path.display());
        self.missing.push(path.to_path_buf());
    }

    pub(crate) fn record_failure(&mut self, path: &Path, message: String) {
        log::warn!("Failed to process {}: {}", path.display(), message);
        self.failures.push((path.to_path_buf(), message));
    }

    /// Number of files handled successfully.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Number of files found missing.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    /// Number of failed files.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted files.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.processed.len() + self.missing.len() + self.failures.len()
    }

    /// Check that no file failed. Missing files do not count as failures.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary, e.g. `Deleted 3 file(s) (12.0 KiB)`.
    #[must_use]
    pub fn summary(&self, verb: &str) -> String {
        let mut text = format!(
            "{verb} {} file(s) ({})",
            self.processed_count(),
            ByteSize::b(self.bytes)
        );
        if !self.missing.is_empty() {
            text.push_str(&format!(", {} already gone", self.missing_count()));
        }
        if !self.failures.is_empty() {
            text.push_str(&format!(", {} failed", self.failure_count()));
        }
        text
    }
}

/// What an action did.
#[derive(Debug)]
pub enum ActionOutcome {
    /// Groups printed to the output stream.
    Listed {
        /// Number of groups
        groups: usize,
    },
    /// Groups written to a report file.
    Reported {
        /// Absolute report path
        path: PathBuf,
        /// Number of groups
        groups: usize,
    },
    /// Files relocated.
    Moved {
        /// Destination folder
        destination: PathBuf,
        /// Per-file outcomes
        batch: BatchResult,
    },
    /// Files removed.
    Deleted(BatchResult),
}

impl ActionOutcome {
    /// Per-file outcomes, for Move and Delete.
    #[must_use]
    pub fn batch(&self) -> Option<&BatchResult> {
        match self {
            Self::Moved { batch, .. } | Self::Deleted(batch) => Some(batch),
            Self::Listed { .. } | Self::Reported { .. } => None,
        }
    }

    /// One-line summary for the end-of-run log.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Listed { groups } => format!("Listed {groups} duplicate group(s)"),
            Self::Reported { path, groups } => {
                format!("Wrote {groups} duplicate group(s) to {}", path.display())
            }
            Self::Moved { destination, batch } => {
                format!("{} to {}", batch.summary("Moved"), destination.display())
            }
            Self::Deleted(batch) => batch.summary("Deleted"),
        }
    }
}

/// Everything an action needs besides the duplicate set.
pub struct ActionContext<'a> {
    /// Directory that was scanned; Move creates its destination here
    pub root: PathBuf,
    /// Report file for [`Action::Report`]
    pub report_path: PathBuf,
    /// Fixed destination folder name for [`Action::Move`]; a timestamp when unset
    pub move_folder: Option<String>,
    /// How [`Action::Delete`] removes files
    pub removal: RemovalMode,
    /// Stream for [`Action::List`]
    pub out: &'a mut dyn Write,
    /// Optional progress callback for Move and Delete
    pub progress: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("root", &self.root)
            .field("report_path", &self.report_path)
            .field("move_folder", &self.move_folder)
            .field("removal", &self.removal)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish_non_exhaustive()
    }
}

impl<'a> ActionContext<'a> {
    /// Create a context for `root`, listing to `out`.
    pub fn new(root: &Path, out: &'a mut dyn Write) -> Self {
        Self {
            root: root.to_path_buf(),
            report_path: PathBuf::from(DEFAULT_REPORT_FILE),
            move_folder: None,
            removal: RemovalMode::default(),
            out,
            progress: None,
        }
    }

    /// Set the report file path.
    #[must_use]
    pub fn with_report_path(mut self, path: PathBuf) -> Self {
        self.report_path = path;
        self
    }

    /// Use a fixed destination folder name instead of a timestamp.
    #[must_use]
    pub fn with_move_folder(mut self, name: Option<String>) -> Self {
        self.move_folder = name;
        self
    }

    /// Set how files are removed.
    #[must_use]
    pub fn with_removal(mut self, removal: RemovalMode) -> Self {
        self.removal = removal;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Destination folder for Move: `<root>/<move_folder or timestamp>`.
    #[must_use]
    pub fn move_destination(&self) -> PathBuf {
        let name = self.move_folder.clone().unwrap_or_else(timestamp_folder);
        self.root.join(name)
    }
}

/// Apply `action` to `set`.
///
/// # Errors
///
/// Returns [`ActionError`] only for failures that stop the action as a whole.
/// Per-file failures of Move and Delete are reported in the [`BatchResult`].
pub fn apply(
    action: Action,
    set: &DuplicateSet,
    ctx: &mut ActionContext<'_>,
) -> Result<ActionOutcome, ActionError> {
    log::debug!("Applying action '{}' to {} group(s)", action, set.len());

    match action {
        Action::List => {
            list(set, &mut *ctx.out)?;
            Ok(ActionOutcome::Listed { groups: set.len() })
        }
        Action::Report => {
            let path = save_report(set, &ctx.report_path)?;
            Ok(ActionOutcome::Reported {
                path,
                groups: set.len(),
            })
        }
        Action::Move => {
            let destination = ctx.move_destination();
            create_destination(&destination)?;
            let batch = move_duplicates(set, &destination, ctx.progress.as_deref());
            Ok(ActionOutcome::Moved { destination, batch })
        }
        Action::Delete => {
            let batch = delete_duplicates(set, ctx.removal, ctx.progress.as_deref());
            Ok(ActionOutcome::Deleted(batch))
        }
    }
}
