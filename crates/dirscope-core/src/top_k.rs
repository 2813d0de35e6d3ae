use std::cmp::Reverse;

use crate::model::FileRecord;

/// Indices of the `limit` largest files, largest first. Equal sizes keep
/// report order.
pub fn top_indices(files: &[FileRecord], limit: usize) -> Vec<usize> {
    let rank = |idx: &usize| (Reverse(files[*idx].size_bytes), *idx);

    if limit == 0 {
        return Vec::new();
    }
    let mut indices: Vec<usize> = (0..files.len()).collect();
    if limit < indices.len() {
        indices.select_nth_unstable_by_key(limit - 1, rank);
        indices.truncate(limit);
    }
    indices.sort_unstable_by_key(rank);
    indices
}

pub fn top_files(files: &[FileRecord], limit: usize) -> Vec<FileRecord> {
    top_indices(files, limit)
        .into_iter()
        .map(|idx| files[idx].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64) -> FileRecord {
        FileRecord {
            name: name.to_string(),
            size_bytes: size,
            size_str: String::new(),
            parent_path: "r".to_string(),
        }
    }

    fn names(files: &[FileRecord]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_top_files_descending_with_stable_ties() {
        let files = vec![
            file("a", 10),
            file("b", 50),
            file("c", 10),
            file("d", 70),
            file("e", 50),
        ];
        assert_eq!(names(&top_files(&files, 3)), vec!["d", "b", "e"]);
        assert_eq!(names(&top_files(&files, 10)), vec!["d", "b", "e", "a", "c"]);
    }

    #[test]
    fn test_top_files_edge_limits() {
        let files = vec![file("a", 1), file("b", 2)];
        assert!(top_files(&files, 0).is_empty());
        assert!(top_files(&[], 5).is_empty());
        assert_eq!(names(&top_files(&files, 1)), vec!["b"]);
    }
}
