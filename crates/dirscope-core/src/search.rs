//! Substring search over the file records, plus the debounced live
//! search state used by the session.
//!
//! Each term change bumps a sequence number. A query is issued once the
//! term has been quiet for the debounce window, stamped with the
//! sequence number current at that time, and its result is applied only
//! if no newer term change happened in the meantime.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::Error;
use crate::model::FileRecord;
use crate::path_key::PathKey;

/// First `limit` files, in report order, whose name or parent path
/// contains `term`.
pub fn search_files(
    files: &[FileRecord],
    path_key: &PathKey,
    term: &str,
    limit: usize,
) -> Vec<FileRecord> {
    if term.is_empty() || limit == 0 {
        return Vec::new();
    }
    let needle = path_key.fold(term);

    let mut hits: Vec<usize> = files
        .par_iter()
        .enumerate()
        .filter(|(_, file)| {
            path_key.fold(&file.name).contains(needle.as_ref())
                || path_key.fold(&file.parent_path).contains(needle.as_ref())
        })
        .map(|(idx, _)| idx)
        .collect();
    hits.truncate(limit);

    hits.into_iter().map(|idx| files[idx].clone()).collect()
}

/// A query issued for one specific term change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub term: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermChange {
    Unchanged,
    /// Too short to query; results were cleared.
    Cleared,
    Scheduled { due: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied(usize),
    /// Superseded by a later term change; result dropped.
    Stale,
    Failed,
}

pub struct LiveSearch {
    min_chars: usize,
    debounce: Duration,
    term: String,
    seq: u64,
    pending_due: Option<Instant>,
    in_flight: bool,
    results: Vec<FileRecord>,
}

impl LiveSearch {
    pub fn new(min_chars: usize, debounce: Duration) -> Self {
        Self {
            min_chars,
            debounce,
            term: String::new(),
            seq: 0,
            pending_due: None,
            in_flight: false,
            results: Vec::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.search_min_chars, config.search_debounce())
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Whether the current term is long enough to show search results
    /// instead of the current directory's files.
    pub fn is_active(&self) -> bool {
        self.term.chars().count() >= self.min_chars
    }

    pub fn results(&self) -> &[FileRecord] {
        &self.results
    }

    pub fn is_pending(&self) -> bool {
        self.pending_due.is_some() || self.in_flight
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_due
    }

    pub fn set_term(&mut self, term: &str, now: Instant) -> TermChange {
        if term == self.term {
            return TermChange::Unchanged;
        }
        self.term = term.to_string();
        self.seq += 1;
        self.in_flight = false;

        if self.is_active() {
            let due = now + self.debounce;
            self.pending_due = Some(due);
            TermChange::Scheduled { due }
        } else {
            self.pending_due = None;
            self.results.clear();
            TermChange::Cleared
        }
    }

    /// Issue the pending query once its debounce window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchTicket> {
        match self.pending_due {
            Some(due) if now >= due => {
                self.pending_due = None;
                self.in_flight = true;
                debug!("Issuing search #{} for '{}'", self.seq, self.term);
                Some(SearchTicket {
                    seq: self.seq,
                    term: self.term.clone(),
                })
            }
            _ => None,
        }
    }

    pub fn complete(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<FileRecord>, Error>,
    ) -> SearchOutcome {
        if ticket.seq != self.seq || !self.in_flight {
            debug!("Dropping stale search #{} for '{}'", ticket.seq, ticket.term);
            return SearchOutcome::Stale;
        }
        self.in_flight = false;

        match result {
            Ok(files) => {
                let count = files.len();
                self.results = files;
                SearchOutcome::Applied(count)
            }
            Err(err) => {
                debug!("Search for '{}' failed: {}", ticket.term, err);
                self.results.clear();
                SearchOutcome::Failed
            }
        }
    }

    pub fn reset(&mut self) {
        self.term.clear();
        self.seq += 1;
        self.pending_due = None;
        self.in_flight = false;
        self.results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn file(parent: &str, name: &str) -> FileRecord {
        FileRecord {
            name: name.to_string(),
            size_bytes: 1,
            size_str: "1 B".to_string(),
            parent_path: parent.to_string(),
        }
    }

    fn engine() -> LiveSearch {
        LiveSearch::new(3, DEBOUNCE)
    }

    #[test]
    fn test_search_matches_name_or_parent_in_report_order() {
        let files = vec![
            file(r"C:\logs", "app.txt"),
            file(r"C:\data", "catalog.db"),
            file(r"C:\data", "readme.md"),
            file(r"C:\other", "logsummary.csv"),
        ];
        let key = PathKey::default();
        let hits = search_files(&files, &key, "log", 10);
        let names: Vec<_> = hits.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["app.txt", "catalog.db", "logsummary.csv"]);

        assert_eq!(search_files(&files, &key, "log", 2).len(), 2);
        assert!(search_files(&files, &key, "LOG", 10).is_empty());
        assert_eq!(search_files(&files, &PathKey::new('\\', false), "LOG", 10).len(), 3);
    }

    #[test]
    fn test_short_terms_clear_without_querying() {
        let t0 = Instant::now();
        let mut search = engine();
        assert_eq!(search.set_term("ab", t0), TermChange::Cleared);
        assert!(search.poll(t0 + DEBOUNCE * 2).is_none());
        assert!(search.results().is_empty());
        assert!(!search.is_active());
    }

    #[test]
    fn test_debounce_collapses_rapid_changes() {
        let t0 = Instant::now();
        let mut search = engine();
        search.set_term("rep", t0);
        search.set_term("repo", t0 + Duration::from_millis(100));
        search.set_term("report", t0 + Duration::from_millis(200));

        assert!(search.poll(t0 + Duration::from_millis(600)).is_none());
        let ticket = search.poll(t0 + Duration::from_millis(700)).unwrap();
        assert_eq!(ticket.term, "report");
        assert!(search.poll(t0 + Duration::from_millis(900)).is_none());
    }

    #[test]
    fn test_superseded_result_is_discarded() {
        let t0 = Instant::now();
        let mut search = engine();

        search.set_term("abc", t0);
        let first = search.poll(t0 + DEBOUNCE).unwrap();
        search.set_term("abcd", t0 + DEBOUNCE);
        let second = search.poll(t0 + DEBOUNCE * 2).unwrap();

        let newer = vec![file("p", "abcd.txt")];
        assert_eq!(search.complete(&second, Ok(newer.clone())), SearchOutcome::Applied(1));
        let older = vec![file("p", "abc.txt"), file("p", "abcx.txt")];
        assert_eq!(search.complete(&first, Ok(older)), SearchOutcome::Stale);
        assert_eq!(search.results(), newer.as_slice());
    }

    #[test]
    fn test_result_arriving_after_term_shortened_is_discarded() {
        let t0 = Instant::now();
        let mut search = engine();
        search.set_term("abc", t0);
        let ticket = search.poll(t0 + DEBOUNCE).unwrap();
        search.set_term("ab", t0 + DEBOUNCE);

        assert_eq!(search.complete(&ticket, Ok(vec![file("p", "abc")])), SearchOutcome::Stale);
        assert!(search.results().is_empty());
    }

    #[test]
    fn test_failure_clears_results() {
        let t0 = Instant::now();
        let mut search = engine();
        search.set_term("abc", t0);
        let ticket = search.poll(t0 + DEBOUNCE).unwrap();
        search.complete(&ticket, Ok(vec![file("p", "abc")]));

        search.set_term("abcd", t0 + DEBOUNCE);
        let ticket = search.poll(t0 + DEBOUNCE * 2).unwrap();
        let outcome = search.complete(&ticket, Err(Error::Other("boom".to_string())));
        assert_eq!(outcome, SearchOutcome::Failed);
        assert!(search.results().is_empty());
        assert!(!search.is_pending());
    }

    #[test]
    fn test_reset_invalidates_in_flight_query() {
        let t0 = Instant::now();
        let mut search = engine();
        search.set_term("abc", t0);
        let ticket = search.poll(t0 + DEBOUNCE).unwrap();
        search.reset();
        assert_eq!(search.complete(&ticket, Ok(vec![file("p", "abc")])), SearchOutcome::Stale);
        assert_eq!(search.term(), "");
    }
}
