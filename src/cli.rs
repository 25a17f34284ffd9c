//! Command-line argument parsing
//!
//! Supports:
//! - Opening a file ("Open With" style path argument)
//! - Driving the view projection (search query, sort column)
//! - Skipping last-session restore

use clap::Parser;
use std::path::PathBuf;

/// A viewer and editor for delimited text files
#[derive(Parser, Debug)]
#[command(
    name = "delimit",
    version,
    about = "A viewer and editor for delimited text files"
)]
pub struct CliArgs {
    /// File to open (reopens the last file when omitted)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Show only rows containing this text (case-insensitive)
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Sort by this column (numeric when the whole column parses as numbers)
    #[arg(short, long, value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Start without restoring the last opened file
    #[arg(short = 'n', long)]
    pub no_restore: bool,
}

/// What to open at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Startup {
    /// Open the given path and remember it as the last file
    Open(PathBuf),
    /// Try the last-session record
    RestoreLast,
    /// Nothing to open
    Empty,
}

impl CliArgs {
    /// Resolve what to open, honoring the reopen-last-file preference
    pub fn startup(&self, reopen_last: bool) -> Startup {
        match &self.path {
            Some(path) => Startup::Open(path.clone()),
            None if self.no_restore || !reopen_last => Startup::Empty,
            None => Startup::RestoreLast,
        }
    }
}
