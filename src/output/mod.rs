//! Output module for run reports and the repository README
//!
//! This module handles:
//! - The per-run Markdown summary (GitHub step summary)
//! - README generation from the quote file
//! - Store statistics for the command line
//! - GitHub Actions workflow commands

pub mod annotations;
mod readme;
mod report;
mod stats;

pub use annotations::Annotator;
pub use readme::{
    checksum, download_links, list_directory, preview_lines, render_readme, write_readme,
    DownloadLinks, ReadmeContext,
};
pub use report::{escape_cell, format_run_report, write_run_report, RunReport};
pub use stats::{print_statistics, StoreStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
