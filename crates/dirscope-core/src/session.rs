//! Everything that belongs to the one live report: summary, navigation,
//! live search, top files, discard plan and notifications.
//!
//! Requests go out through a [`Dispatcher`]; completions are applied by
//! [`Session::pump`] on the owning thread. A successful load bumps the
//! report epoch, makes the provider switch to the new report and resets
//! all state at once, so completions belonging to an older report are
//! dropped when they arrive. Until then every query, including the
//! synchronous parent check in [`Session::ascend`], sees the old report.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::discard::{DiscardEntry, DiscardPlan};
use crate::dispatch::{Completion, Dispatcher, Envelope, Request};
use crate::error::Error;
use crate::model::{AnalysisSummary, BreakdownItem, FileRecord};
use crate::navigation::{FetchOutcome, NavState, Navigator};
use crate::notice::{Failure, FailureKind, Notice};
use crate::progress::LoadProgress;
use crate::provider::RecordProvider;
use crate::report;
use crate::search::{LiveSearch, SearchOutcome, TermChange};

/// A report load in flight.
#[derive(Debug, Clone)]
pub struct LoadState {
    pub report: PathBuf,
    pub started_at: Instant,
    pub progress: Option<LoadProgress>,
    epoch: u64,
}

impl LoadState {
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}

pub struct Session {
    config: AppConfig,
    dispatcher: Dispatcher,
    epoch: u64,
    loading: Option<LoadState>,
    summary: Option<AnalysisSummary>,
    navigator: Navigator,
    search: LiveSearch,
    discard: DiscardPlan,
    top_files: Vec<FileRecord>,
    banner: Option<Failure>,
    notice: Option<Notice>,
}

impl Session {
    pub fn new(config: AppConfig, provider: Arc<dyn RecordProvider>) -> Self {
        let path_key = config.path_key();
        Self {
            dispatcher: Dispatcher::new(provider),
            epoch: 0,
            loading: None,
            summary: None,
            navigator: Navigator::new(path_key),
            search: LiveSearch::from_config(&config),
            discard: DiscardPlan::new(path_key),
            top_files: Vec::new(),
            banner: None,
            notice: None,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Start loading `report`. Only `.txt` reports are accepted; the
    /// current report stays live until the new one has loaded.
    pub fn open_report(&mut self, report: impl AsRef<Path>, now: Instant) -> Result<(), Error> {
        if self.loading.is_some() {
            return Err(Error::LoadInProgress);
        }
        let report = report.as_ref();
        report::ensure_supported_report(report)?;

        let epoch = self.epoch + 1;
        self.banner = None;
        self.loading = Some(LoadState {
            report: report.to_path_buf(),
            started_at: now,
            progress: None,
            epoch,
        });
        self.dispatcher.submit(
            epoch,
            Request::Load {
                report: report.to_path_buf(),
            },
        );
        Ok(())
    }

    fn adopt(&mut self, epoch: u64, summary: AnalysisSummary) {
        info!(
            "Report adopted: root '{}', {} directories, {} files",
            summary.root_path, summary.total_dirs, summary.total_files
        );
        self.epoch = epoch;
        self.discard.clear();
        self.search.reset();
        self.top_files.clear();
        self.banner = None;
        self.notice = None;

        let request = self.navigator.load(&summary.root_path);
        self.summary = Some(summary);
        self.dispatcher
            .submit(epoch, Request::DirContent { path: request.path });
        self.dispatcher.submit(
            epoch,
            Request::TopFiles {
                limit: self.config.top_files_limit,
            },
        );
    }

    /// Apply every completion that has arrived and issue a debounced
    /// search if one is due. Returns the number of completions handled.
    pub fn pump(&mut self, now: Instant) -> usize {
        let mut handled = 0;
        while let Some(envelope) = self.dispatcher.try_next() {
            self.handle(envelope, now);
            handled += 1;
        }
        self.issue_due_search(now);
        handled
    }

    /// Pump until no request or debounced search is outstanding, or until
    /// `timeout` elapses. Returns whether the session went idle.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            self.pump(now);
            if self.is_idle() {
                return true;
            }
            if now >= deadline {
                return false;
            }

            let mut wait = deadline - now;
            if let Some(due) = self.search.next_deadline() {
                wait = wait.min(due.saturating_duration_since(now));
            }
            if let Some(envelope) = self.dispatcher.next_timeout(wait) {
                self.handle(envelope, Instant::now());
            }
        }
    }

    /// Provider calls issued but not answered yet.
    pub fn outstanding_requests(&self) -> usize {
        self.dispatcher.outstanding()
    }

    pub fn is_idle(&self) -> bool {
        let search_waiting = self.summary.is_some() && self.search.is_pending();
        self.loading.is_none() && self.dispatcher.outstanding() == 0 && !search_waiting
    }

    fn issue_due_search(&mut self, now: Instant) {
        if self.summary.is_none() {
            return;
        }
        if let Some(ticket) = self.search.poll(now) {
            self.dispatcher.submit(
                self.epoch,
                Request::Search {
                    ticket,
                    limit: self.config.search_limit,
                },
            );
        }
    }

    fn handle(&mut self, envelope: Envelope, now: Instant) {
        let Envelope { epoch, completion } = envelope;
        match completion {
            Completion::Progress(progress) => {
                if let Some(state) = self.loading.as_mut().filter(|s| s.epoch == epoch) {
                    state.progress = Some(progress);
                }
            }
            Completion::Loaded(result) => {
                if !self.loading.as_ref().is_some_and(|s| s.epoch == epoch) {
                    return;
                }
                self.loading = None;
                match result {
                    Ok(summary) => {
                        if self.dispatcher.provider().activate_report() {
                            self.adopt(epoch, summary);
                        } else {
                            error!("Report '{}' parsed but not activated", summary.root_path);
                            self.raise(Failure::new(FailureKind::ReportParse, &Error::NotLoaded));
                        }
                    }
                    Err(err) => {
                        error!("Report load failed: {}", err);
                        self.raise(Failure::new(FailureKind::ReportParse, &err));
                    }
                }
            }
            Completion::DirContent { path, result } => {
                if epoch != self.epoch {
                    debug!("Dropping directory content from an older report");
                    return;
                }
                let failure = result
                    .as_ref()
                    .err()
                    .map(|err| Failure::new(FailureKind::DirectoryFetch, err));
                if let FetchOutcome::Failed { reverted_to } = self.navigator.apply(&path, result) {
                    if let Some(previous) = reverted_to {
                        debug!("View reverted to '{}'", previous);
                    }
                    if let Some(failure) = failure {
                        self.raise(failure);
                    }
                }
            }
            Completion::TopFiles(result) => {
                if epoch != self.epoch {
                    return;
                }
                match result {
                    Ok(files) => self.top_files = files,
                    Err(err) => warn!("Loading largest files failed: {}", err),
                }
            }
            Completion::Search { ticket, result } => {
                if epoch != self.epoch {
                    return;
                }
                let failure = result
                    .as_ref()
                    .err()
                    .map(|err| Failure::new(FailureKind::Search, err));
                if let (SearchOutcome::Failed, Some(failure)) =
                    (self.search.complete(&ticket, result), failure)
                {
                    self.raise(failure);
                }
            }
            // The write happened whatever report is live now, so report it.
            Completion::Exported {
                destination,
                result,
            } => match result {
                Ok(()) => {
                    self.notice = Some(Notice::new(
                        format!("Discard list exported to {}", destination.display()),
                        now,
                        self.config.notice_ttl(),
                    ));
                }
                Err(err) => {
                    error!("Export to '{}' failed: {}", destination.display(), err);
                    self.raise(Failure::new(FailureKind::Export, &err));
                }
            },
        }
    }

    /// Show a failure as the banner, or only log it when its kind is not
    /// shown to the user.
    fn raise(&mut self, failure: Failure) {
        if failure.is_surfaced() {
            self.banner = Some(failure);
        } else {
            warn!("{}", failure);
        }
    }

    /// Ask again for the current directory's content, e.g. after the
    /// first fetch of a report failed and nothing is displayed yet.
    pub fn refresh(&mut self) -> bool {
        match self.navigator.refresh() {
            Some(request) => {
                self.dispatcher
                    .submit(self.epoch, Request::DirContent { path: request.path });
                true
            }
            None => false,
        }
    }

    pub fn descend(&mut self, child_path: &str) -> bool {
        match self.navigator.descend(child_path) {
            Some(request) => {
                self.dispatcher
                    .submit(self.epoch, Request::DirContent { path: request.path });
                true
            }
            None => false,
        }
    }

    pub fn ascend(&mut self) -> bool {
        let provider = Arc::clone(self.dispatcher.provider());
        let request = self.navigator.ascend(|parent| {
            provider.has_directory(parent).unwrap_or_else(|err| {
                warn!("Could not check '{}': {}", parent, err);
                false
            })
        });
        match request {
            Some(request) => {
                self.dispatcher
                    .submit(self.epoch, Request::DirContent { path: request.path });
                true
            }
            None => false,
        }
    }

    pub fn set_search_term(&mut self, term: &str, now: Instant) -> TermChange {
        self.search.set_term(term, now)
    }

    pub fn add_to_discard(&mut self, file: &FileRecord) -> bool {
        self.discard.add(file, &file.parent_path)
    }

    pub fn remove_from_discard(&mut self, index: usize) -> Result<DiscardEntry, Error> {
        self.discard.remove(index)
    }

    /// Hand the plan to the provider for writing. Does nothing and returns
    /// false when the plan is empty.
    pub fn export_discard(&mut self, destination: impl AsRef<Path>) -> bool {
        if self.discard.is_empty() {
            return false;
        }
        self.dispatcher.submit(
            self.epoch,
            Request::Export {
                destination: destination.as_ref().to_path_buf(),
                lines: self.discard.export_lines(),
            },
        );
        true
    }

    pub fn summary(&self) -> Option<&AnalysisSummary> {
        self.summary.as_ref()
    }

    pub fn loading(&self) -> Option<&LoadState> {
        self.loading.as_ref()
    }

    pub fn nav_state(&self) -> &NavState {
        self.navigator.state()
    }

    pub fn current_path(&self) -> Option<&str> {
        self.navigator.current_path()
    }

    pub fn breakdown(&self) -> Vec<BreakdownItem> {
        self.navigator.breakdown(&self.config.files_bucket_label)
    }

    /// Direct files of the displayed directory.
    pub fn current_files(&self) -> &[FileRecord] {
        self.navigator
            .content()
            .map(|content| content.files.as_slice())
            .unwrap_or(&[])
    }

    /// Search results while a search term is active, else the displayed
    /// directory's files.
    pub fn visible_files(&self) -> &[FileRecord] {
        if self.search.is_active() {
            self.search.results()
        } else {
            self.current_files()
        }
    }

    pub fn search(&self) -> &LiveSearch {
        &self.search
    }

    pub fn top_files(&self) -> &[FileRecord] {
        &self.top_files
    }

    pub fn discard(&self) -> &DiscardPlan {
        &self.discard
    }

    pub fn banner(&self) -> Option<&Failure> {
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn notice(&self, now: Instant) -> Option<&Notice> {
        self.notice.as_ref().filter(|notice| notice.is_live(now))
    }
}
