//! dupsweep - find files with identical content and dispose of the copies.
//!
//! The pipeline is:
//! 1. [`scanner::Walker`] enumerates every regular file below a root
//! 2. [`duplicates::DuplicateDetector`] narrows them with a partial digest of
//!    the first 4 KiB, then confirms with a full-content digest
//! 3. [`actions::apply`] lists, reports, moves, or deletes the duplicates
//!
//! [`run_app`] wires these together for the command-line binary.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::sync::Arc;

use anyhow::Context;
use bytesize::ByteSize;

use crate::actions::{apply, ActionContext, ActionOutcome};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DetectorConfig, DuplicateDetector};
use crate::error::ExitCode;
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{Hasher, Walker};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for every fatal condition: unreadable root, invalid
/// configuration, hash failure under the abort policy, interruption, and
/// action failures that stop the action as a whole.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    let handler = signal::install_handler()?;
    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(cli.quiet));

    let walker = Walker::new(&cli.path).with_shutdown_flag(handler.get_flag());
    let (files, walk_errors) = walker
        .collect_files()
        .with_context(|| format!("Cannot scan {}", cli.path.display()))?;

    if handler.is_shutdown_requested() {
        return Err(duplicates::DetectError::Interrupted.into());
    }
    if !walk_errors.is_empty() {
        log::warn!("{} entries could not be read while scanning", walk_errors.len());
    }
    log::info!("Collected {} files", files.len());

    if files.is_empty() {
        log::info!("Nothing to do here. Bye!");
        return Ok(ExitCode::Success);
    }

    let detector_config = DetectorConfig::default()
        .with_io_threads(config.io_threads)
        .with_read_errors(config.on_read_error)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::clone(&progress));
    let detector = DuplicateDetector::new(detector_config)
        .with_hasher(Hasher::new().with_algorithm(config.algorithm));

    let (duplicates, stats) = detector
        .detect(&files)
        .context("Duplicate detection failed")?;

    if !stats.skipped.is_empty() {
        log::warn!(
            "{} unreadable file(s) were skipped and are not part of the results",
            stats.skipped.len()
        );
    }

    if duplicates.is_empty() {
        log::info!("No duplicates were found. Have a nice day.");
    } else {
        log::info!(
            "Found {} duplicated file content(s) across {} files",
            duplicates.len(),
            duplicates.file_count()
        );
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut ctx = ActionContext::new(&cli.path, &mut out)
        .with_report_path(config.report_file.clone())
        .with_move_folder(config.move_folder.clone())
        .with_removal(config.removal_mode())
        .with_progress(Arc::clone(&progress));

    let outcome = apply(cli.action.into(), &duplicates, &mut ctx)?;
    log::info!("{}", outcome.summary());

    if let ActionOutcome::Moved { batch, .. } | ActionOutcome::Deleted(batch) = &outcome {
        for (path, message) in &batch.failures {
            log::warn!("  {}: {}", path.display(), message);
        }
        log::debug!(
            "{} processed ({}), {} missing, {} failed",
            batch.processed_count(),
            ByteSize::b(batch.bytes),
            batch.missing_count(),
            batch.failure_count()
        );
    }

    log::info!("All done.");
    Ok(ExitCode::Success)
}
