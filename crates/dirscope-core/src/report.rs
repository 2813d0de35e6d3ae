//! Parser for the plain-text directory report.
//!
//! ```text
//! C:\Data [1.5 GB]
//!   [700 MB] backup.zip
//!   [12 KB] notes.txt
//! C:\Data\Photos [800 MB]
//! ```
//!
//! Directory lines are `<path> [<size>]`. File lines start with two
//! spaces and `[` and belong to the directory line above them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::Error;
use crate::hierarchy::Hierarchy;
use crate::model::{AnalysisSummary, DirRecord, FileRecord};
use crate::progress::{LoadProgress, ProgressReporter};

const FILE_LINE_PREFIX: &str = "  [";

/// A fully parsed and indexed report.
pub struct Report {
    pub summary: AnalysisSummary,
    pub hierarchy: Hierarchy,
    pub malformed_lines: usize,
}

pub fn is_supported_report(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

pub fn ensure_supported_report(path: &Path) -> Result<(), Error> {
    if is_supported_report(path) {
        Ok(())
    } else {
        Err(Error::UnsupportedReport(path.display().to_string()))
    }
}

/// Convert a size such as `1.5 GB` or `12,3 KB` to bytes. Units are binary
/// multiples; unknown units count as bytes and unreadable numbers as zero.
pub fn parse_size(size_str: &str) -> u64 {
    let size_str = size_str.trim().to_uppercase();
    let mut num_str = String::new();
    let mut unit = String::new();

    for c in size_str.chars() {
        if c.is_ascii_digit() || c == '.' {
            num_str.push(c);
        } else if c == ',' {
            num_str.push('.');
        } else if c.is_alphabetic() {
            unit.push(c);
        }
    }

    let val: f64 = num_str.parse().unwrap_or(0.0);
    let multiplier = match unit.as_str() {
        "TB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "GB" => 1024.0 * 1024.0 * 1024.0,
        "MB" => 1024.0 * 1024.0,
        "KB" => 1024.0,
        _ => 1.0,
    };

    (val * multiplier) as u64
}

enum Line<'a> {
    Dir { path: &'a str, size_str: &'a str },
    File { name: &'a str, size_str: &'a str },
    Malformed,
}

fn classify(line: &str) -> Line<'_> {
    if line.starts_with(FILE_LINE_PREFIX) {
        return match line.trim().split_once(']') {
            Some((size, name)) if !name.trim().is_empty() => Line::File {
                name: name.trim(),
                size_str: size.trim_start_matches('[').trim(),
            },
            _ => Line::Malformed,
        };
    }

    match line.rsplit_once(" [") {
        Some((path, size)) if !path.trim().is_empty() => Line::Dir {
            path: path.trim(),
            size_str: size.trim().trim_end_matches(']').trim(),
        },
        _ => Line::Malformed,
    }
}

pub fn parse_report_file(
    path: &Path,
    config: &AppConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Report, Error> {
    ensure_supported_report(path)?;
    let report_name = path.display().to_string();
    reporter.on_load_start(&report_name);
    info!("Loading report {}", report_name);

    let start = Instant::now();
    let file = File::open(path)?;
    let report = parse_report_reader(BufReader::new(file), config, reporter)?;

    let duration = start.elapsed().as_secs_f64();
    reporter.on_load_complete(&report.summary, duration);
    info!(
        "Report loaded in {:.2}s: {} directories, {} files, {} bytes",
        duration,
        report.summary.total_dirs,
        report.summary.total_files,
        report.summary.total_size_bytes
    );
    Ok(report)
}

pub fn parse_report_reader<R: BufRead>(
    mut reader: R,
    config: &AppConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Report, Error> {
    let path_key = config.path_key();
    let mut dirs: Vec<DirRecord> = Vec::new();
    let mut files: Vec<FileRecord> = Vec::new();
    let mut current_dir: Option<String> = None;
    let mut malformed_lines = 0usize;
    let mut line_no = 0u64;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let decoded = String::from_utf8_lossy(&buf);
        let mut line = decoded.trim_end_matches(['\r', '\n']);
        if line_no == 1 {
            line = line.trim_start_matches('\u{feff}');
        }
        if line.trim().is_empty() {
            continue;
        }

        match classify(line) {
            Line::Dir { path, size_str } => {
                let path = path_key.canonicalize(path).to_string();
                dirs.push(DirRecord {
                    path: path.clone(),
                    size_bytes: parse_size(size_str),
                    size_str: size_str.to_string(),
                });
                current_dir = Some(path);
            }
            Line::File { name, size_str } => match current_dir.as_ref() {
                Some(parent) => files.push(FileRecord {
                    name: name.to_string(),
                    size_bytes: parse_size(size_str),
                    size_str: size_str.to_string(),
                    parent_path: parent.clone(),
                }),
                None => {
                    debug!("Line {}: file entry before any directory", line_no);
                    malformed_lines += 1;
                }
            },
            Line::Malformed => {
                debug!("Line {}: unrecognised entry", line_no);
                malformed_lines += 1;
            }
        }

        if config.progress_every_lines > 0 && line_no % config.progress_every_lines == 0 {
            reporter.on_load_progress(&LoadProgress {
                count: (dirs.len() + files.len()) as u64,
                status: "Reading report".to_string(),
            });
        }
    }

    if malformed_lines > 0 {
        warn!("{} malformed report lines skipped", malformed_lines);
    }

    reporter.on_load_progress(&LoadProgress {
        count: (dirs.len() + files.len()) as u64,
        status: format!("Indexing {} directories", dirs.len()),
    });

    let hierarchy = Hierarchy::build(path_key, dirs, files);
    let summary = summarize(&hierarchy)?;

    Ok(Report {
        summary,
        hierarchy,
        malformed_lines,
    })
}

fn summarize(hierarchy: &Hierarchy) -> Result<AnalysisSummary, Error> {
    let root = hierarchy
        .first_root()
        .ok_or_else(|| Error::Parse("inconsistent report: no directory records".to_string()))?;

    let total_size_bytes = hierarchy
        .roots()
        .iter()
        .fold(0u64, |acc, dir| acc.saturating_add(dir.size_bytes));

    Ok(AnalysisSummary {
        total_size_bytes,
        total_dirs: hierarchy.dir_count(),
        total_files: hierarchy.file_count(),
        root_path: root.path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use std::io::Cursor;
    use std::sync::Mutex;

    const SAMPLE: &str = "C:\\Data [1 GB]\r\n  [512 MB] backup.zip\r\n  [1,5 KB] notes.txt\r\n\r\nC:\\Data\\Photos [300 MB]\r\n  [300 MB] trip.mov\r\nC:\\Data\\Photos\\2023 [0 B]\r\n";

    fn parse(text: &str) -> Result<Report, Error> {
        parse_report_reader(Cursor::new(text.as_bytes()), &AppConfig::default(), &SilentReporter)
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("1 KB"), 1024);
        assert_eq!(parse_size("1,5 KB"), 1536);
        assert_eq!(parse_size("2.5 mb"), 2_621_440);
        assert_eq!(parse_size("1 TB"), 1_099_511_627_776);
        assert_eq!(parse_size("42 Bytes"), 42);
        assert_eq!(parse_size("garbage"), 0);
    }

    #[test]
    fn test_parse_sample_report() {
        let report = parse(SAMPLE).unwrap();
        assert_eq!(report.summary.total_dirs, 3);
        assert_eq!(report.summary.total_files, 3);
        assert_eq!(report.summary.root_path, r"C:\Data");
        assert_eq!(report.summary.total_size_bytes, 1024 * 1024 * 1024);
        assert_eq!(report.malformed_lines, 0);

        let files = report.hierarchy.direct_files(r"C:\Data");
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].name, "notes.txt");
        assert_eq!(files[1].size_str, "1,5 KB");
        assert_eq!(files[1].parent_path, r"C:\Data");
    }

    #[test]
    fn test_file_names_may_contain_brackets() {
        let report = parse("C:\\A [10 B]\n  [10 B] song [live].mp3\n").unwrap();
        assert_eq!(report.hierarchy.files()[0].name, "song [live].mp3");
    }

    #[test]
    fn test_directory_paths_may_contain_brackets() {
        let report = parse("C:\\A [x] b [10 B]\n").unwrap();
        assert_eq!(report.summary.root_path, r"C:\A [x] b");
        assert_eq!(report.summary.total_size_bytes, 10);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let report = parse("  [1 KB] orphan.txt\nno size here\nC:\\A\\ [2 KB]\n  [] \n").unwrap();
        assert_eq!(report.malformed_lines, 3);
        assert_eq!(report.summary.root_path, r"C:\A");
        assert_eq!(report.summary.total_files, 0);
    }

    #[test]
    fn test_report_without_directories_is_rejected() {
        assert!(matches!(parse(""), Err(Error::Parse(_))));
        assert!(matches!(parse("  [1 KB] a.txt\n"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_multiple_roots_sum_into_total() {
        let report = parse("C:\\A [10 B]\nD:\\B [5 B]\nC:\\A\\x [4 B]\n").unwrap();
        assert_eq!(report.summary.total_size_bytes, 15);
        assert_eq!(report.summary.root_path, r"C:\A");
    }

    #[test]
    fn test_extension_check() {
        assert!(is_supported_report(Path::new("scan.txt")));
        assert!(is_supported_report(Path::new("SCAN.TXT")));
        assert!(!is_supported_report(Path::new("scan.csv")));
        assert!(!is_supported_report(Path::new("scan")));
        assert!(matches!(
            ensure_supported_report(Path::new("scan.log")),
            Err(Error::UnsupportedReport(_))
        ));
    }

    struct Recorder(Mutex<Vec<LoadProgress>>);

    impl ProgressReporter for Recorder {
        fn on_load_progress(&self, progress: &LoadProgress) {
            self.0.lock().unwrap().push(progress.clone());
        }
    }

    #[test]
    fn test_progress_emitted_periodically() {
        let config = AppConfig {
            progress_every_lines: 2,
            ..AppConfig::default()
        };
        let recorder = Recorder(Mutex::new(Vec::new()));
        let text = "r [4 B]\n  [1 B] a\n  [1 B] b\n  [1 B] c\n  [1 B] d\n";
        parse_report_reader(Cursor::new(text.as_bytes()), &config, &recorder).unwrap();

        let events = recorder.0.lock().unwrap();
        let counts: Vec<u64> = events.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![2, 4, 5]);
        assert!(events.last().unwrap().status.starts_with("Indexing"));
    }
}
