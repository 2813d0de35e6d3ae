use crate::model::{BreakdownItem, BreakdownKind, DirRecord, FileRecord};
use crate::path_key::PathKey;

/// Size breakdown of one directory: a bucket for its direct files (only
/// when they weigh something) followed by one entry per subdirectory,
/// sorted largest first. Equal values keep insertion order.
pub fn build_breakdown(
    direct_files: &[FileRecord],
    children: &[DirRecord],
    path_key: &PathKey,
    files_label: &str,
) -> Vec<BreakdownItem> {
    let mut items = Vec::with_capacity(children.len() + 1);

    let direct_size = direct_files
        .iter()
        .fold(0u64, |acc, file| acc.saturating_add(file.size_bytes));
    if direct_size > 0 {
        items.push(BreakdownItem {
            name: files_label.to_string(),
            value: direct_size,
            kind: BreakdownKind::FilesBucket,
            path: None,
        });
    }

    items.extend(children.iter().map(|dir| BreakdownItem {
        name: path_key.leaf_name(&dir.path).to_string(),
        value: dir.size_bytes,
        kind: BreakdownKind::DirBucket,
        path: Some(dir.path.clone()),
    }));

    items.sort_by(|a, b| b.value.cmp(&a.value));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "[Direct files]";

    fn dir(path: &str, size: u64) -> DirRecord {
        DirRecord {
            path: path.to_string(),
            size_bytes: size,
            size_str: String::new(),
        }
    }

    fn file(name: &str, size: u64) -> FileRecord {
        FileRecord {
            name: name.to_string(),
            size_bytes: size,
            size_str: String::new(),
            parent_path: r"C:\A".to_string(),
        }
    }

    #[test]
    fn test_files_bucket_then_dirs_by_size() {
        let files = vec![file("a", 35), file("b", 25)];
        let children = vec![dir(r"C:\A\D", 25), dir(r"C:\A\B", 40)];
        let items = build_breakdown(&files, &children, &PathKey::default(), LABEL);

        let summary: Vec<_> = items
            .iter()
            .map(|i| (i.kind, i.name.as_str(), i.value))
            .collect();
        assert_eq!(
            summary,
            vec![
                (BreakdownKind::FilesBucket, LABEL, 60),
                (BreakdownKind::DirBucket, "B", 40),
                (BreakdownKind::DirBucket, "D", 25),
            ]
        );
        assert_eq!(items[0].path, None);
        assert_eq!(items[1].path.as_deref(), Some(r"C:\A\B"));
    }

    #[test]
    fn test_empty_files_bucket_is_omitted() {
        let files = vec![file("empty", 0)];
        let items = build_breakdown(&files, &[dir(r"C:\A\B", 1)], &PathKey::default(), LABEL);
        assert_eq!(items.len(), 1);
        assert!(items[0].is_dir());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let files = vec![file("x", 10)];
        let children = vec![dir(r"C:\A\z", 10), dir(r"C:\A\y", 10)];
        let items = build_breakdown(&files, &children, &PathKey::default(), LABEL);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec![LABEL, "z", "y"]);
    }
}
