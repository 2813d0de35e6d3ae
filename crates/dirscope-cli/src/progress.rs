use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use dirscope_core::{AnalysisSummary, LoadProgress, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn print_loaded(summary: &AnalysisSummary, duration_secs: f64) {
    eprintln!(
        "  \x1b[32m✓\x1b[0m Report loaded: {} directories, {} files, {} in {:.2}s",
        summary.total_dirs,
        summary.total_files,
        bytesize::to_string(summary.total_size_bytes, false),
        duration_secs
    );
}

/// Progress reporter for the one-shot commands, which parse on the main
/// thread.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_load_start(&self, report: &str) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(spinner(format!("Reading {}...", report)));
    }

    fn on_load_progress(&self, progress: &LoadProgress) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!("{}... {} records", progress.status, progress.count));
        }
    }

    fn on_load_complete(&self, summary: &AnalysisSummary, duration_secs: f64) {
        self.finish_bar();
        print_loaded(summary, duration_secs);
    }
}

/// Spinner for a load running inside a session. The shell polls the
/// session and feeds the latest progress in.
pub struct LoadSpinner {
    pb: ProgressBar,
}

impl LoadSpinner {
    pub fn start(report: &str) -> Self {
        Self {
            pb: spinner(format!("Reading {}...", report)),
        }
    }

    pub fn update(&self, progress: Option<&LoadProgress>, elapsed: Duration) {
        let message = match progress {
            Some(progress) => format!(
                "{}... {} records ({}s)",
                progress.status,
                progress.count,
                elapsed.as_secs()
            ),
            None => format!("Reading report... ({}s)", elapsed.as_secs()),
        };
        self.pb.set_message(message);
    }

    pub fn finish(self, loaded: Option<(&AnalysisSummary, Duration)>) {
        self.pb.finish_and_clear();
        if let Some((summary, elapsed)) = loaded {
            print_loaded(summary, elapsed.as_secs_f64());
        }
    }
}
