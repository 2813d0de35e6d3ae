use colored::*;
use dirscope_core::discard::DiscardPlan;
use dirscope_core::hierarchy::Diagnostics;
use dirscope_core::{AnalysisSummary, BreakdownItem, BreakdownKind, FileRecord, PathKey};

const BAR_WIDTH: usize = 24;

pub fn human(bytes: u64) -> String {
    bytesize::to_string(bytes, false)
}

fn bar(value: u64, total: u64) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((value as f64 / total as f64) * BAR_WIDTH as f64).round() as usize
    };
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "━".repeat(filled), "─".repeat(BAR_WIDTH - filled))
}

pub fn print_summary(
    summary: &AnalysisSummary,
    diagnostics: Option<&Diagnostics>,
    malformed_lines: usize,
) {
    println!("{} {}", "Root:".bold(), summary.root_path.cyan());
    println!("{} {}", "Total size:".bold(), human(summary.total_size_bytes).green());
    println!("{} {}", "Directories:".bold(), summary.total_dirs);
    println!("{} {}", "Files:".bold(), summary.total_files);

    if malformed_lines > 0 {
        println!("{} {}", "Malformed lines skipped:".yellow(), malformed_lines);
    }
    if let Some(diag) = diagnostics {
        if diag.orphan_files > 0 {
            println!("{} {}", "Files without a known folder:".yellow(), diag.orphan_files);
        }
        if diag.duplicate_dirs > 0 {
            println!("{} {}", "Duplicate folder records:".yellow(), diag.duplicate_dirs);
        }
        if !diag.undersized_dirs.is_empty() {
            println!(
                "{} {}",
                "Folders smaller than their contents:".yellow(),
                diag.undersized_dirs.len()
            );
        }
    }
}

pub fn print_breakdown(path: &str, items: &[BreakdownItem]) {
    let total: u64 = items.iter().map(|item| item.value).sum();
    println!("{} {}  {}", "▸".cyan(), path.bold(), human(total).dimmed());
    if items.is_empty() {
        println!("  {}", "(empty)".dimmed());
        return;
    }

    for item in items {
        let percent = if total == 0 {
            0.0
        } else {
            item.value as f64 * 100.0 / total as f64
        };
        let name = match item.kind {
            BreakdownKind::FilesBucket => item.name.yellow(),
            BreakdownKind::DirBucket => item.name.cyan(),
        };
        println!(
            "  {} {:>10} {:>5.1}%  {}",
            bar(item.value, total).dimmed(),
            human(item.value),
            percent,
            name
        );
    }
}

/// Numbered file list; `with_parent` adds each file's folder.
pub fn print_files(files: &[FileRecord], with_parent: bool) {
    if files.is_empty() {
        println!("  {}", "(no files)".dimmed());
        return;
    }
    for (idx, file) in files.iter().enumerate() {
        if with_parent {
            println!(
                "  {:>4}  {:>10}  {}  {}",
                idx + 1,
                human(file.size_bytes),
                file.name,
                file.parent_path.dimmed()
            );
        } else {
            println!("  {:>4}  {:>10}  {}", idx + 1, human(file.size_bytes), file.name);
        }
    }
}

pub fn print_plan(plan: &DiscardPlan, path_key: &PathKey) {
    if plan.is_empty() {
        println!("  {}", "Discard list is empty".dimmed());
        return;
    }
    for (idx, entry) in plan.entries().iter().enumerate() {
        println!(
            "  {:>4}  {:>10}  {}",
            idx + 1,
            human(entry.file.size_bytes),
            entry.full_path(path_key)
        );
    }
    println!(
        "  {} {} in {} files",
        "Total:".bold(),
        human(plan.total_size()).green(),
        plan.len()
    );
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.red());
}

pub fn print_ok(message: &str) {
    eprintln!("  {} {}", "✓".green(), message);
}
