//! Which directory is being viewed, and which fetched content may be shown.
//!
//! Every transition hands back a [`DirRequest`] for the new path. A fetch
//! result is adopted only while the machine still points at the path it
//! was requested for; anything else is dropped on arrival.

use tracing::{debug, warn};

use crate::breakdown::build_breakdown;
use crate::error::Error;
use crate::model::{BreakdownItem, DirRecord, FileRecord};
use crate::path_key::PathKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Unloaded,
    Viewing(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirRequest {
    pub path: String,
}

/// Immediate subdirectories and direct files of `path`, as last fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirContent {
    pub path: String,
    pub dirs: Vec<DirRecord>,
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Stale,
    /// The fetch failed. The view moved back to the last path whose
    /// content is displayed, if there is one. With nothing displayed yet
    /// (a failed root fetch) the path stays pending until
    /// [`Navigator::refresh`] asks for it again.
    Failed { reverted_to: Option<String> },
}

pub struct Navigator {
    path_key: PathKey,
    state: NavState,
    content: Option<DirContent>,
}

impl Navigator {
    pub fn new(path_key: PathKey) -> Self {
        Self {
            path_key,
            state: NavState::Unloaded,
            content: None,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn current_path(&self) -> Option<&str> {
        match &self.state {
            NavState::Viewing(path) => Some(path),
            NavState::Unloaded => None,
        }
    }

    /// Last adopted content. While a fetch is pending this still belongs
    /// to the previous path.
    pub fn content(&self) -> Option<&DirContent> {
        self.content.as_ref()
    }

    fn current_content(&self) -> Option<&DirContent> {
        let current = self.current_path()?;
        self.content.as_ref().filter(|content| content.path == current)
    }

    /// True while the current path's content has not arrived yet.
    pub fn is_pending(&self) -> bool {
        self.current_path().is_some() && self.current_content().is_none()
    }

    pub fn load(&mut self, root_path: &str) -> DirRequest {
        self.content = None;
        self.go_to(root_path.to_string())
    }

    /// Move into one of the current directory's immediate children.
    /// Ignored when `child` is not one of them.
    pub fn descend(&mut self, child: &str) -> Option<DirRequest> {
        let wanted = self.path_key.fold(self.path_key.canonicalize(child)).into_owned();
        let target = self
            .current_content()?
            .dirs
            .iter()
            .find(|dir| self.path_key.fold(&dir.path) == wanted)?
            .path
            .clone();
        Some(self.go_to(target))
    }

    /// Move to the parent directory, if it exists in the report.
    pub fn ascend(&mut self, is_known_dir: impl FnOnce(&str) -> bool) -> Option<DirRequest> {
        let current = self.current_path()?;
        let parent = match self.path_key.parent_of(current) {
            Ok(parent) => parent.to_string(),
            Err(_) => {
                debug!("'{}' has no parent, staying put", current);
                return None;
            }
        };
        if !is_known_dir(&parent) {
            debug!("Parent '{}' is not in the report, staying put", parent);
            return None;
        }
        Some(self.go_to(parent))
    }

    /// Fetch the current path again.
    pub fn refresh(&self) -> Option<DirRequest> {
        self.current_path().map(|path| DirRequest {
            path: path.to_string(),
        })
    }

    fn go_to(&mut self, path: String) -> DirRequest {
        self.state = NavState::Viewing(path.clone());
        DirRequest { path }
    }

    pub fn apply(
        &mut self,
        path: &str,
        result: Result<(Vec<DirRecord>, Vec<FileRecord>), Error>,
    ) -> FetchOutcome {
        if self.current_path() != Some(path) {
            debug!("Dropping stale content for '{}'", path);
            return FetchOutcome::Stale;
        }

        match result {
            Ok((dirs, files)) => {
                self.content = Some(DirContent {
                    path: path.to_string(),
                    dirs,
                    files,
                });
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!("Loading '{}' failed: {}", path, err);
                let reverted_to = self
                    .content
                    .as_ref()
                    .map(|content| content.path.clone())
                    .filter(|previous| previous != path);
                if let Some(previous) = &reverted_to {
                    self.state = NavState::Viewing(previous.clone());
                }
                FetchOutcome::Failed { reverted_to }
            }
        }
    }

    /// Breakdown of the displayed content.
    pub fn breakdown(&self, files_label: &str) -> Vec<BreakdownItem> {
        match &self.content {
            Some(content) => build_breakdown(&content.files, &content.dirs, &self.path_key, files_label),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(path: &str, size: u64) -> DirRecord {
        DirRecord {
            path: path.to_string(),
            size_bytes: size,
            size_str: String::new(),
        }
    }

    fn content(dirs: &[&str]) -> Result<(Vec<DirRecord>, Vec<FileRecord>), Error> {
        Ok((dirs.iter().map(|p| dir(p, 1)).collect(), Vec::new()))
    }

    fn loaded_at_root() -> Navigator {
        let mut nav = Navigator::new(PathKey::default());
        let request = nav.load("C:");
        assert_eq!(request.path, "C:");
        assert_eq!(nav.apply("C:", content(&[r"C:\A", r"C:\B"])), FetchOutcome::Applied);
        nav
    }

    #[test]
    fn test_starts_unloaded() {
        let mut nav = Navigator::new(PathKey::default());
        assert_eq!(nav.state(), &NavState::Unloaded);
        assert!(nav.descend(r"C:\A").is_none());
        assert!(nav.ascend(|_| true).is_none());
    }

    #[test]
    fn test_descend_only_into_immediate_children() {
        let mut nav = loaded_at_root();
        assert!(nav.descend(r"C:\Z").is_none());
        assert!(nav.descend(r"C:\A\deep").is_none());
        assert_eq!(nav.current_path(), Some("C:"));

        let request = nav.descend(r"C:\A").unwrap();
        assert_eq!(request.path, r"C:\A");
        assert_eq!(nav.current_path(), Some(r"C:\A"));
        assert!(nav.is_pending());
    }

    #[test]
    fn test_descend_waits_for_current_content() {
        let mut nav = loaded_at_root();
        nav.descend(r"C:\A").unwrap();
        // C:\A's children are not known yet.
        assert!(nav.descend(r"C:\A\x").is_none());
        nav.apply(r"C:\A", content(&[r"C:\A\x"]));
        assert!(nav.descend(r"C:\A\x").is_some());
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let mut nav = loaded_at_root();
        nav.descend(r"C:\A").unwrap();
        nav.ascend(|_| true).unwrap();
        nav.apply("C:", content(&[r"C:\A", r"C:\B"]));
        nav.descend(r"C:\B").unwrap();

        assert_eq!(nav.apply(r"C:\A", content(&[r"C:\A\x"])), FetchOutcome::Stale);
        assert_eq!(nav.content().unwrap().path, "C:");
        assert_eq!(nav.apply(r"C:\B", content(&[])), FetchOutcome::Applied);
        assert_eq!(nav.content().unwrap().path, r"C:\B");
    }

    #[test]
    fn test_ascend_from_single_segment_is_noop() {
        let mut nav = loaded_at_root();
        assert!(nav.ascend(|_| true).is_none());
        assert_eq!(nav.current_path(), Some("C:"));
    }

    #[test]
    fn test_ascend_to_unknown_parent_is_noop() {
        let mut nav = Navigator::new(PathKey::default());
        nav.load(r"C:\Users\me");
        assert!(nav.ascend(|path| path == "C:").is_none());
        assert_eq!(nav.current_path(), Some(r"C:\Users\me"));

        let request = nav.ascend(|path| path == r"C:\Users").unwrap();
        assert_eq!(request.path, r"C:\Users");
    }

    #[test]
    fn test_failed_fetch_reverts_to_displayed_path() {
        let mut nav = loaded_at_root();
        nav.descend(r"C:\A").unwrap();
        let outcome = nav.apply(r"C:\A", Err(Error::Other("gone".to_string())));
        assert_eq!(
            outcome,
            FetchOutcome::Failed {
                reverted_to: Some("C:".to_string())
            }
        );
        assert_eq!(nav.current_path(), Some("C:"));
        assert!(!nav.is_pending());
    }

    #[test]
    fn test_failed_initial_fetch_stays_on_root() {
        let mut nav = Navigator::new(PathKey::default());
        nav.load("C:");
        let outcome = nav.apply("C:", Err(Error::NotLoaded));
        assert_eq!(outcome, FetchOutcome::Failed { reverted_to: None });
        assert_eq!(nav.current_path(), Some("C:"));
        assert!(nav.is_pending());
        assert!(nav.descend(r"C:\A").is_none());

        let request = nav.refresh().unwrap();
        assert_eq!(request.path, "C:");
        assert_eq!(nav.apply("C:", content(&[r"C:\A"])), FetchOutcome::Applied);
        assert!(!nav.is_pending());
        assert!(nav.descend(r"C:\A").is_some());
    }

    #[test]
    fn test_refresh_requires_a_path() {
        let nav = Navigator::new(PathKey::default());
        assert!(nav.refresh().is_none());
    }

    #[test]
    fn test_breakdown_uses_displayed_content() {
        let mut nav = Navigator::new(PathKey::default());
        assert!(nav.breakdown("files").is_empty());
        nav.load("C:");
        nav.apply("C:", Ok((vec![dir(r"C:\A", 5), dir(r"C:\B", 9)], Vec::new())));
        let names: Vec<_> = nav.breakdown("files").into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
