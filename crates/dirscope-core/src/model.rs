use serde::{Deserialize, Serialize};

/// A file listed in a report. Only the leaf name is stored; the full
/// path is `parent_path` + separator + `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub size_bytes: u64,
    /// Size as written in the report. Display only.
    pub size_str: String,
    pub parent_path: String,
}

/// A directory listed in a report. `size_bytes` is the scanner's
/// aggregate for the whole subtree and is never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirRecord {
    pub path: String,
    pub size_bytes: u64,
    pub size_str: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_size_bytes: u64,
    pub total_dirs: usize,
    pub total_files: usize,
    pub root_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakdownKind {
    FilesBucket,
    DirBucket,
}

/// One bar of the current directory's breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub name: String,
    pub value: u64,
    pub kind: BreakdownKind,
    /// Set for `DirBucket` only.
    pub path: Option<String>,
}

impl BreakdownItem {
    pub fn is_dir(&self) -> bool {
        self.kind == BreakdownKind::DirBucket
    }
}
