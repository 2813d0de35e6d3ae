use std::fmt;
use std::time::{Duration, Instant};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ReportParse,
    DirectoryFetch,
    Search,
    Export,
}

/// A failed request, converted at the point where its completion is
/// handled. Search failures are logged but never shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, err: &Error) -> Self {
        Self {
            kind,
            message: err.to_string(),
        }
    }

    pub fn is_surfaced(&self) -> bool {
        self.kind != FailureKind::Search
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = match self.kind {
            FailureKind::ReportParse => "Could not analyze report",
            FailureKind::DirectoryFetch => "Could not load directory",
            FailureKind::Search => "Search failed",
            FailureKind::Export => "Could not export discard list",
        };
        write!(f, "{}: {}", context, self.message)
    }
}

/// Transient confirmation with an explicit expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            expires_at: now + ttl,
        }
    }

    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expiry() {
        let t0 = Instant::now();
        let notice = Notice::new("Exported", t0, Duration::from_secs(3));
        assert!(notice.is_live(t0));
        assert!(notice.is_live(t0 + Duration::from_millis(2999)));
        assert!(!notice.is_live(t0 + Duration::from_secs(3)));
    }

    #[test]
    fn test_failure_display() {
        let failure = Failure::new(FailureKind::Export, &Error::Other("disk full".to_string()));
        assert_eq!(failure.to_string(), "Could not export discard list: disk full");
        assert!(failure.is_surfaced());
        assert!(!Failure::new(FailureKind::Search, &Error::NotLoaded).is_surfaced());
    }
}
