use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::config::AppConfig;
use crate::discard;
use crate::error::Error;
use crate::hierarchy::Diagnostics;
use crate::model::{AnalysisSummary, DirRecord, FileRecord};
use crate::progress::ProgressReporter;
use crate::provider::RecordProvider;
use crate::report::{self, Report};
use crate::search;
use crate::top_k;

/// In-process record provider. Holds the live report as an immutable
/// snapshot. A successful parse stages the new report; it replaces the
/// live one only on activation, and a failed parse leaves both alone.
/// Readers clone the `Arc` and never hold the lock while querying.
pub struct ReportStore {
    config: AppConfig,
    current: RwLock<Option<Arc<Report>>>,
    staged: Mutex<Option<Arc<Report>>>,
}

impl ReportStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            current: RwLock::new(None),
            staged: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> Result<Arc<Report>, Error> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::NotLoaded)
    }


    pub fn diagnostics(&self) -> Result<Diagnostics, Error> {
        let report = self.snapshot()?;
        Ok(report.hierarchy.diagnostics())
    }

    pub fn roots(&self) -> Result<Vec<DirRecord>, Error> {
        let report = self.snapshot()?;
        Ok(report.hierarchy.roots().into_iter().cloned().collect())
    }
}

impl RecordProvider for ReportStore {
    fn parse_report(
        &self,
        path: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<AnalysisSummary, Error> {
        let report = report::parse_report_file(path, &self.config, reporter)?;
        let summary = report.summary.clone();
        *self.staged.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(report));
        Ok(summary)
    }

    fn activate_report(&self) -> bool {
        let staged = self
            .staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match staged {
            Some(report) => {
                debug!("Activating report rooted at '{}'", report.summary.root_path);
                *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(report);
                true
            }
            None => false,
        }
    }

    fn get_dir_content(&self, path: &str) -> Result<(Vec<DirRecord>, Vec<FileRecord>), Error> {
        let report = self.snapshot()?;
        let dirs: Vec<DirRecord> = report
            .hierarchy
            .immediate_children(path)
            .into_iter()
            .cloned()
            .collect();
        let files: Vec<FileRecord> = report
            .hierarchy
            .direct_files(path)
            .into_iter()
            .cloned()
            .collect();
        debug!(
            "Content of '{}': {} directories, {} files",
            path,
            dirs.len(),
            files.len()
        );
        Ok((dirs, files))
    }

    fn get_top_files(&self, limit: usize) -> Result<Vec<FileRecord>, Error> {
        let report = self.snapshot()?;
        Ok(top_k::top_files(report.hierarchy.files(), limit))
    }

    fn search_files(&self, term: &str, limit: usize) -> Result<Vec<FileRecord>, Error> {
        let report = self.snapshot()?;
        let path_key = report.hierarchy.path_key();
        Ok(search::search_files(
            report.hierarchy.files(),
            &path_key,
            term,
            limit,
        ))
    }

    fn has_directory(&self, path: &str) -> Result<bool, Error> {
        let report = self.snapshot()?;
        Ok(report.hierarchy.contains_dir(path))
    }

    fn save_discard_list(&self, destination: &Path, lines: &[String]) -> Result<(), Error> {
        discard::write_discard_list(destination, lines)
    }
}
