//! Ancestor/child queries over a flat set of directory and file records.
//!
//! No tree is built. Directories are kept sorted by their folded path
//! key, so the descendants of `P` occupy one contiguous run starting at
//! `P + separator`, found with two binary searches. Files are indexed by
//! folded parent path the same way.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::model::{DirRecord, FileRecord};
use crate::path_key::PathKey;

struct DirEntry {
    key: String,
    order: usize,
    record: DirRecord,
}

pub struct Hierarchy {
    path_key: PathKey,
    dirs: Vec<DirEntry>,
    files: Vec<FileRecord>,
    files_by_parent: Vec<(String, usize)>,
    duplicate_dirs: usize,
}

/// Data-quality findings. None of these prevent a report from loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Files whose parent path is not a known directory.
    pub orphan_files: usize,
    /// Directory records dropped because their path was already present.
    pub duplicate_dirs: usize,
    /// Directories whose reported size is below the sum of their
    /// immediate children and direct files.
    pub undersized_dirs: Vec<String>,
}

impl Hierarchy {
    pub fn build(path_key: PathKey, dirs: Vec<DirRecord>, files: Vec<FileRecord>) -> Self {
        let mut entries: Vec<DirEntry> = dirs
            .into_iter()
            .enumerate()
            .map(|(order, mut record)| {
                record.path = path_key.canonicalize(&record.path).to_string();
                let key = path_key.fold(&record.path).into_owned();
                DirEntry { key, order, record }
            })
            .collect();
        entries.par_sort_by(|a, b| a.key.cmp(&b.key).then(a.order.cmp(&b.order)));

        let before = entries.len();
        entries.dedup_by(|later, earlier| {
            if later.key == earlier.key {
                warn!("Duplicate directory record '{}' ignored", later.record.path);
                true
            } else {
                false
            }
        });
        let duplicate_dirs = before - entries.len();

        let files: Vec<FileRecord> = files
            .into_iter()
            .map(|mut file| {
                file.parent_path = path_key.canonicalize(&file.parent_path).to_string();
                file
            })
            .collect();
        let mut files_by_parent: Vec<(String, usize)> = files
            .iter()
            .enumerate()
            .map(|(idx, file)| (path_key.fold(&file.parent_path).into_owned(), idx))
            .collect();
        // Stable, so files under one parent stay in report order.
        files_by_parent.par_sort_by(|a, b| a.0.cmp(&b.0));

        debug!(
            "Hierarchy indexed: {} directories, {} files, {} duplicates dropped",
            entries.len(),
            files.len(),
            duplicate_dirs
        );

        Self {
            path_key,
            dirs: entries,
            files,
            files_by_parent,
            duplicate_dirs,
        }
    }

    pub fn path_key(&self) -> PathKey {
        self.path_key
    }

    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// All files in report order.
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    fn position(&self, folded: &str) -> Option<usize> {
        self.dirs
            .binary_search_by(|entry| entry.key.as_str().cmp(folded))
            .ok()
    }

    pub fn find(&self, path: &str) -> Option<&DirRecord> {
        let folded = self.path_key.fold(self.path_key.canonicalize(path));
        self.position(&folded).map(|idx| &self.dirs[idx].record)
    }

    pub fn contains_dir(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    fn is_root_entry(&self, entry: &DirEntry) -> bool {
        self.path_key
            .ancestor_prefixes(&entry.key)
            .all(|prefix| self.position(prefix).is_none())
    }

    /// Directories with no proper ancestor in the set, sorted by path key.
    pub fn roots(&self) -> Vec<&DirRecord> {
        self.dirs
            .iter()
            .filter(|entry| self.is_root_entry(entry))
            .map(|entry| &entry.record)
            .collect()
    }

    /// The root that appears first in the report.
    pub fn first_root(&self) -> Option<&DirRecord> {
        self.dirs
            .iter()
            .filter(|entry| self.is_root_entry(entry))
            .min_by_key(|entry| entry.order)
            .map(|entry| &entry.record)
    }

    /// Contiguous run of every directory strictly below `folded`.
    fn descendant_range(&self, folded: &str) -> &[DirEntry] {
        let mut prefix = String::with_capacity(folded.len() + 1);
        prefix.push_str(folded);
        prefix.push(self.path_key.separator());

        let lo = self
            .dirs
            .partition_point(|entry| entry.key.as_str() < prefix.as_str());
        let len = self.dirs[lo..].partition_point(|entry| entry.key.starts_with(&prefix));
        &self.dirs[lo..lo + len]
    }

    /// Directories exactly one segment below `path`, in report order.
    pub fn immediate_children(&self, path: &str) -> Vec<&DirRecord> {
        let folded = self.path_key.fold(self.path_key.canonicalize(path));
        let separator = self.path_key.separator();
        let skip = folded.len() + separator.len_utf8();

        let mut children: Vec<&DirEntry> = self
            .descendant_range(&folded)
            .iter()
            .filter(|entry| !entry.key[skip..].contains(separator))
            .collect();
        children.sort_by_key(|entry| entry.order);
        children.into_iter().map(|entry| &entry.record).collect()
    }

    /// Files whose parent is exactly `path`, in report order.
    pub fn direct_files(&self, path: &str) -> Vec<&FileRecord> {
        let folded = self.path_key.fold(self.path_key.canonicalize(path));
        self.files_under_key(&folded)
            .iter()
            .map(|(_, idx)| &self.files[*idx])
            .collect()
    }

    fn files_under_key(&self, folded: &str) -> &[(String, usize)] {
        let lo = self
            .files_by_parent
            .partition_point(|(key, _)| key.as_str() < folded);
        let len = self.files_by_parent[lo..].partition_point(|(key, _)| key == folded);
        &self.files_by_parent[lo..lo + len]
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let mut orphan_files = 0;
        let mut idx = 0;
        while idx < self.files_by_parent.len() {
            let key = &self.files_by_parent[idx].0;
            let group = self.files_under_key(key).len();
            if self.position(key).is_none() {
                orphan_files += group;
            }
            idx += group;
        }

        let undersized_dirs: Vec<String> = self
            .dirs
            .par_iter()
            .filter_map(|entry| {
                let children: u64 = self
                    .immediate_children(&entry.record.path)
                    .iter()
                    .map(|dir| dir.size_bytes)
                    .sum();
                let files: u64 = self
                    .files_under_key(&entry.key)
                    .iter()
                    .map(|(_, idx)| self.files[*idx].size_bytes)
                    .sum();
                let contents = children.saturating_add(files);
                (entry.record.size_bytes < contents).then(|| entry.record.path.clone())
            })
            .collect();

        if orphan_files > 0 {
            warn!("{} files reference a directory missing from the report", orphan_files);
        }
        if !undersized_dirs.is_empty() {
            debug!(
                "{} directories report less than the sum of their contents",
                undersized_dirs.len()
            );
        }

        Diagnostics {
            orphan_files,
            duplicate_dirs: self.duplicate_dirs,
            undersized_dirs,
        }
    }
}
