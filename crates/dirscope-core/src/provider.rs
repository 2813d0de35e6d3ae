use std::path::Path;

use crate::error::Error;
use crate::model::{AnalysisSummary, DirRecord, FileRecord};
use crate::progress::ProgressReporter;

/// The record source behind a session. Calls may block; the session
/// runs them off the interaction thread.
pub trait RecordProvider: Send + Sync {
    /// Parse a report and hold it ready. Queries keep answering from the
    /// live report until [`RecordProvider::activate_report`] is called.
    fn parse_report(
        &self,
        report: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<AnalysisSummary, Error>;

    /// Make the last successfully parsed report the live one. Returns
    /// false when no parsed report is waiting.
    fn activate_report(&self) -> bool;

    /// Immediate subdirectories and direct files of `path`.
    fn get_dir_content(&self, path: &str) -> Result<(Vec<DirRecord>, Vec<FileRecord>), Error>;

    /// The `limit` largest files of the whole report, largest first.
    fn get_top_files(&self, limit: usize) -> Result<Vec<FileRecord>, Error>;

    /// Files whose name or parent path contains `term`.
    fn search_files(&self, term: &str, limit: usize) -> Result<Vec<FileRecord>, Error>;

    fn has_directory(&self, path: &str) -> Result<bool, Error>;

    /// Write one path per line to `destination`.
    fn save_discard_list(&self, destination: &Path, lines: &[String]) -> Result<(), Error>;
}
