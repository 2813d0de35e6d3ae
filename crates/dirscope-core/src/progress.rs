use serde::{Deserialize, Serialize};

use crate::model::AnalysisSummary;

/// Periodic notification emitted while a report loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadProgress {
    pub count: u64,
    pub status: String,
}

/// Trait for reporting report-load progress.
///
/// The CLI implements it with indicatif, the session forwards it over its
/// completion channel. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_load_start(&self, _path: &str) {}
    fn on_load_progress(&self, _progress: &LoadProgress) {}
    fn on_load_complete(&self, _summary: &AnalysisSummary, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
