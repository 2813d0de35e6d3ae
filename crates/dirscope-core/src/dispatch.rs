//! Runs provider calls off the interaction thread. Each request gets its
//! own worker; results come back over one channel, stamped with the
//! report epoch they were issued under.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::error;

use crate::error::Error;
use crate::model::{AnalysisSummary, DirRecord, FileRecord};
use crate::progress::{LoadProgress, ProgressReporter};
use crate::provider::RecordProvider;
use crate::search::SearchTicket;

pub enum Request {
    Load { report: PathBuf },
    DirContent { path: String },
    TopFiles { limit: usize },
    Search { ticket: SearchTicket, limit: usize },
    Export { destination: PathBuf, lines: Vec<String> },
}

pub enum Completion {
    /// Intermediate load progress; not a completion of its request.
    Progress(LoadProgress),
    Loaded(Result<AnalysisSummary, Error>),
    DirContent {
        path: String,
        result: Result<(Vec<DirRecord>, Vec<FileRecord>), Error>,
    },
    TopFiles(Result<Vec<FileRecord>, Error>),
    Search {
        ticket: SearchTicket,
        result: Result<Vec<FileRecord>, Error>,
    },
    Exported {
        destination: PathBuf,
        result: Result<(), Error>,
    },
}

pub struct Envelope {
    pub epoch: u64,
    pub completion: Completion,
}

impl Request {
    fn fail(&self, err: Error) -> Completion {
        match self {
            Request::Load { .. } => Completion::Loaded(Err(err)),
            Request::DirContent { path } => Completion::DirContent {
                path: path.clone(),
                result: Err(err),
            },
            Request::TopFiles { .. } => Completion::TopFiles(Err(err)),
            Request::Search { ticket, .. } => Completion::Search {
                ticket: ticket.clone(),
                result: Err(err),
            },
            Request::Export { destination, .. } => Completion::Exported {
                destination: destination.clone(),
                result: Err(err),
            },
        }
    }
}

/// Forwards load progress into the completion channel.
struct ChannelReporter {
    epoch: u64,
    tx: Mutex<Sender<Envelope>>,
}

impl ProgressReporter for ChannelReporter {
    fn on_load_progress(&self, progress: &LoadProgress) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = tx.send(Envelope {
            epoch: self.epoch,
            completion: Completion::Progress(progress.clone()),
        });
    }
}

fn execute(
    provider: &dyn RecordProvider,
    epoch: u64,
    request: &Request,
    tx: &Sender<Envelope>,
) -> Completion {
    match request {
        Request::Load { report } => {
            let reporter = ChannelReporter {
                epoch,
                tx: Mutex::new(tx.clone()),
            };
            Completion::Loaded(provider.parse_report(report, &reporter))
        }
        Request::DirContent { path } => Completion::DirContent {
            path: path.clone(),
            result: provider.get_dir_content(path),
        },
        Request::TopFiles { limit } => Completion::TopFiles(provider.get_top_files(*limit)),
        Request::Search { ticket, limit } => Completion::Search {
            ticket: ticket.clone(),
            result: provider.search_files(&ticket.term, *limit),
        },
        Request::Export { destination, lines } => Completion::Exported {
            destination: destination.clone(),
            result: provider.save_discard_list(destination, lines),
        },
    }
}

pub struct Dispatcher {
    provider: Arc<dyn RecordProvider>,
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
    outstanding: usize,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn RecordProvider>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            provider,
            tx,
            rx,
            outstanding: 0,
        }
    }

    pub fn provider(&self) -> &Arc<dyn RecordProvider> {
        &self.provider
    }

    /// Requests submitted whose completion has not been received yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn submit(&mut self, epoch: u64, request: Request) {
        self.outstanding += 1;
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();

        thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                execute(provider.as_ref(), epoch, &request, &tx)
            }));
            let completion = outcome.unwrap_or_else(|_| {
                error!("Provider call panicked");
                request.fail(Error::Other("provider call panicked".to_string()))
            });
            let _ = tx.send(Envelope { epoch, completion });
        });
    }

    fn track(&mut self, envelope: &Envelope) {
        if !matches!(envelope.completion, Completion::Progress(_)) {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
    }

    pub fn try_next(&mut self) -> Option<Envelope> {
        let envelope = self.rx.try_recv().ok()?;
        self.track(&envelope);
        Some(envelope)
    }

    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Envelope> {
        let envelope = self.rx.recv_timeout(timeout).ok()?;
        self.track(&envelope);
        Some(envelope)
    }
}
