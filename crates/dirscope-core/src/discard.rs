//! The discard plan: files the user intends to delete by hand later.
//! Nothing here ever deletes anything; the plan is only exported as a
//! plain list of paths.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Error;
use crate::model::FileRecord;
use crate::path_key::PathKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardEntry {
    pub file: FileRecord,
    pub parent_path: String,
}

impl DiscardEntry {
    /// Full path of the file, as written to the exported list.
    pub fn full_path(&self, path_key: &PathKey) -> String {
        path_key.join(&self.parent_path, &self.file.name)
    }
}

pub struct DiscardPlan {
    path_key: PathKey,
    entries: Vec<DiscardEntry>,
    keys: HashSet<String>,
    total: u64,
}

impl DiscardPlan {
    pub fn new(path_key: PathKey) -> Self {
        Self {
            path_key,
            entries: Vec::new(),
            keys: HashSet::new(),
            total: 0,
        }
    }

    fn identity(&self, parent_path: &str, name: &str) -> String {
        self.path_key
            .fold(&self.path_key.join(parent_path, name))
            .into_owned()
    }

    /// Append `file` unless the same path is already planned.
    /// Returns whether the plan changed.
    pub fn add(&mut self, file: &FileRecord, parent_path: &str) -> bool {
        let key = self.identity(parent_path, &file.name);
        if !self.keys.insert(key) {
            debug!("'{}' already in discard plan", file.name);
            return false;
        }
        self.total = self.total.saturating_add(file.size_bytes);
        self.entries.push(DiscardEntry {
            file: file.clone(),
            parent_path: parent_path.to_string(),
        });
        true
    }

    pub fn remove(&mut self, index: usize) -> Result<DiscardEntry, Error> {
        if index >= self.entries.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let entry = self.entries.remove(index);
        let key = self.identity(&entry.parent_path, &entry.file.name);
        self.keys.remove(&key);
        self.total = self.total.saturating_sub(entry.file.size_bytes);
        Ok(entry)
    }

    pub fn entries(&self) -> &[DiscardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes that would be reclaimed if every planned file were removed.
    pub fn total_size(&self) -> u64 {
        self.total
    }

    pub fn export_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.full_path(&self.path_key))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
        self.total = 0;
    }
}

/// Write one path per line, replacing `destination` if it exists.
pub fn write_discard_list(destination: &Path, lines: &[String]) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(destination)?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} discard entries to '{}'",
        lines.len(),
        destination.display()
    );
    Ok(())
}
