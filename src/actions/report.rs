//! Plain-text listing of duplicate groups.
//!
//! Both the List action and the report file use one format: each group is
//! its hex digest followed by a colon, then one tab-indented path per line.
//!
//! ```text
//! 5d41402abc4b2a76b9719d911017c592:
//! 	/data/a.txt
//! 	/data/b.txt
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::ActionError;
use crate::duplicates::DuplicateSet;

/// Report file name used when none is configured.
pub const DEFAULT_REPORT_FILE: &str = "results.txt";

/// Write every group of `set` to `writer`.
///
/// # Errors
///
/// Returns any I/O error raised by the writer.
pub fn write_groups<W: Write + ?Sized>(set: &DuplicateSet, writer: &mut W) -> io::Result<()> {
    for group in set {
        writeln!(writer, "{}:", group.digest)?;
        for path in &group.files {
            writeln!(writer, "\t{}", path.display())?;
        }
    }
    writer.flush()
}

/// Print the groups to an output stream.
///
/// # Errors
///
/// Returns [`ActionError::Output`] if the stream cannot be written.
pub fn list(set: &DuplicateSet, out: &mut dyn Write) -> Result<(), ActionError> {
    write_groups(set, out).map_err(ActionError::Output)
}

/// Write the groups to `path`, replacing any existing file.
///
/// A relative `path` is resolved against the current working directory.
/// Returns the absolute path written.
///
/// # Errors
///
/// Returns [`ActionError::Report`] if the file cannot be created or written.
pub fn save_report(set: &DuplicateSet, path: &Path) -> Result<PathBuf, ActionError> {
    let report_err = |source| ActionError::Report {
        path: path.to_path_buf(),
        source,
    };

    let absolute = std::path::absolute(path).map_err(report_err)?;
    let file = File::create(&absolute).map_err(report_err)?;
    let mut writer = BufWriter::new(file);
    write_groups(set, &mut writer).map_err(report_err)?;

    log::info!("Report saved to {}", absolute.display());
    Ok(absolute)
}
