//! Command-line interface definitions for dupsweep.
//!
//! This module defines all CLI arguments using the clap derive API. Options
//! left unset fall back to the configuration file and environment (see
//! [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Print duplicate groups
//! dupsweep list ~/Downloads
//!
//! # Write them to results.txt in the current directory
//! dupsweep file ~/Downloads
//!
//! # Collect every copy under ~/Downloads/<timestamp>/<digest>/
//! dupsweep move ~/Downloads
//!
//! # Keep the first copy of each group, send the rest to the trash
//! dupsweep --trash delete ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::actions::Action;
use crate::duplicates::ReadErrorPolicy;
use crate::scanner::HashAlgorithm;

/// Find files with identical content and list, report, move, or delete them.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// What to do with the duplicates
    #[arg(value_enum, value_name = "ACTION")]
    pub action: ActionArg,

    /// Directory to search recursively
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Digest algorithm
    #[arg(long, value_enum, value_name = "ALG")]
    pub algorithm: Option<HashAlgorithm>,

    /// What to do when a file cannot be read
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_read_error: Option<ReadErrorPolicy>,

    /// Report file written by the `file` action (default: results.txt)
    #[arg(long, value_name = "FILE")]
    pub report_file: Option<PathBuf>,

    /// Fixed destination folder name for the `move` action
    ///
    /// Defaults to the current local time, e.g. 2024-01-31_235959.
    #[arg(long, value_name = "NAME")]
    pub move_folder: Option<String>,

    /// Move deleted files to the system trash instead of removing them
    #[arg(long)]
    pub trash: bool,
}

/// Action names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Print duplicate groups to stdout
    List,
    /// Write duplicate groups to the report file
    File,
    /// Move every duplicate into a new folder under PATH
    Move,
    /// Delete every duplicate except the first of each group
    Delete,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::List => Self::List,
            ActionArg::File => Self::Report,
            ActionArg::Move => Self::Move,
            ActionArg::Delete => Self::Delete,
        }
    }
}
