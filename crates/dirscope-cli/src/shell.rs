use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use colored::*;
use dirscope_core::search::TermChange;
use dirscope_core::{AppConfig, FileRecord, PathKey, ReportStore, Session};
use tracing::debug;

use crate::output;
use crate::progress::LoadSpinner;
use crate::prompt_confirm;

const TICK: Duration = Duration::from_millis(100);

const HELP: &str = "\
  ls               breakdown of the current folder
  cd <name|path>   open a subfolder (cd .. goes up)
  up               go to the parent folder
  refresh          load the current folder again
  files            files of the current folder, or search results
  find [term]      search the whole report; no term clears the search
  top              largest files in the report
  add <n>          add file n of the last list to the discard list
  plan             show the discard list
  rm <n>           remove entry n from the discard list
  export <dest>    write the discard list to a file
  open <report>    load another report
  help             this text
  quit             leave";

pub struct Shell {
    session: Session,
    path_key: PathKey,
    listed: Vec<FileRecord>,
    last_notice: Option<Instant>,
}

impl Shell {
    pub fn new(config: AppConfig) -> Self {
        let path_key = config.path_key();
        let provider = Arc::new(ReportStore::new(config.clone()));
        Self {
            session: Session::new(config, provider),
            path_key,
            listed: Vec::new(),
            last_notice: None,
        }
    }

    pub fn run(&mut self, report: Option<&Path>) -> Result<()> {
        if let Some(report) = report {
            self.open(report);
        } else {
            println!("No report loaded. Use {} to load one.", "open <report>".bold());
        }

        let mut input = String::new();
        loop {
            input.clear();
            print!("{} ", "dirscope>".cyan().bold());
            io::stdout().flush()?;
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }

            let line = input.trim();
            if line.is_empty() {
                continue;
            }
            let (command, arg) = match line.split_once(char::is_whitespace) {
                Some((command, arg)) => (command, arg.trim()),
                None => (line, ""),
            };
            debug!("Shell command '{}' '{}'", command, arg);

            match command {
                "quit" | "exit" | "q" => break,
                "help" | "?" => println!("{}", HELP),
                "open" => self.open(Path::new(arg)),
                _ if self.session.summary().is_none() => {
                    output::print_error("No report loaded yet");
                }
                "ls" => self.show_breakdown(),
                "cd" => self.change_dir(arg),
                "up" => self.up(),
                "refresh" => self.refresh(),
                "files" => self.show_files(),
                "find" => self.find(arg),
                "top" => self.show_top(),
                "add" => self.add(arg),
                "plan" => output::print_plan(self.session.discard(), &self.path_key),
                "rm" => self.remove(arg),
                "export" => self.export(arg)?,
                _ => output::print_error(&format!("Unknown command '{}', try help", command)),
            }
        }
        Ok(())
    }

    /// Pump the session until it is idle, then surface whatever failed or
    /// finished.
    fn wait(&mut self) {
        while !self.session.settle(TICK) {}
        self.report_status();
    }

    fn report_status(&mut self) {
        if let Some(banner) = self.session.banner() {
            output::print_error(&banner.to_string());
            self.session.dismiss_banner();
        }
        let now = Instant::now();
        if let Some(notice) = self.session.notice(now) {
            if self.last_notice != Some(notice.expires_at) {
                self.last_notice = Some(notice.expires_at);
                output::print_ok(&notice.message);
            }
        }
    }

    fn open(&mut self, report: &Path) {
        if report.as_os_str().is_empty() {
            output::print_error("Usage: open <report>");
            return;
        }
        if let Err(err) = self.session.open_report(report, Instant::now()) {
            output::print_error(&err.to_string());
            return;
        }

        let spinner = LoadSpinner::start(&report.display().to_string());
        let mut elapsed = Duration::ZERO;
        loop {
            let idle = self.session.settle(TICK);
            match self.session.loading() {
                Some(loading) => {
                    elapsed = loading.elapsed(Instant::now());
                    spinner.update(loading.progress.as_ref(), elapsed);
                }
                None if idle => break,
                None => {}
            }
        }

        if self.session.banner().is_some() {
            spinner.finish(None);
            self.report_status();
            return;
        }
        spinner.finish(self.session.summary().map(|summary| (summary, elapsed)));
        self.listed.clear();
        self.show_breakdown();
    }

    fn show_breakdown(&self) {
        if let Some(path) = self.session.current_path() {
            output::print_breakdown(path, &self.session.breakdown());
        }
    }

    fn change_dir(&mut self, arg: &str) {
        if arg.is_empty() {
            output::print_error("Usage: cd <name|path>");
            return;
        }
        if arg == ".." {
            self.up();
            return;
        }
        let Some(current) = self.session.current_path() else {
            return;
        };
        let target = if arg.contains(self.path_key.separator()) {
            arg.to_string()
        } else {
            self.path_key.join(current, arg)
        };

        if self.session.descend(&target) {
            self.wait();
            self.show_breakdown();
        } else {
            output::print_error(&format!("'{}' is not a subfolder here", arg));
        }
    }

    fn up(&mut self) {
        if self.session.ascend() {
            self.wait();
            self.show_breakdown();
        } else {
            output::print_error("Already at the top of the report");
        }
    }

    fn refresh(&mut self) {
        if self.session.refresh() {
            self.wait();
            self.show_breakdown();
        }
    }

    fn show_files(&mut self) {
        let searching = self.session.search().is_active();
        self.listed = self.session.visible_files().to_vec();
        if searching {
            println!("Results for '{}':", self.session.search().term().bold());
        }
        output::print_files(&self.listed, searching);
    }

    fn find(&mut self, term: &str) {
        match self.session.set_search_term(term, Instant::now()) {
            TermChange::Cleared if !term.is_empty() => {
                println!(
                    "{}",
                    format!(
                        "Search needs at least {} characters",
                        self.session.config().search_min_chars
                    )
                    .dimmed()
                );
            }
            TermChange::Cleared | TermChange::Unchanged | TermChange::Scheduled { .. } => {}
        }
        self.wait();
        self.show_files();
    }

    fn show_top(&mut self) {
        self.listed = self.session.top_files().to_vec();
        output::print_files(&self.listed, true);
    }

    fn add(&mut self, arg: &str) {
        let Some(file) = parse_index(arg, self.listed.len()).map(|idx| self.listed[idx].clone())
        else {
            return;
        };
        if self.session.add_to_discard(&file) {
            output::print_ok(&format!(
                "Added {} ({} in list)",
                file.name,
                output::human(self.session.discard().total_size())
            ));
        } else {
            println!("{} is already in the discard list", file.name);
        }
    }

    fn remove(&mut self, arg: &str) {
        let Some(idx) = parse_index(arg, self.session.discard().len()) else {
            return;
        };
        match self.session.remove_from_discard(idx) {
            Ok(entry) => output::print_ok(&format!("Removed {}", entry.file.name)),
            Err(err) => output::print_error(&err.to_string()),
        }
    }

    fn export(&mut self, arg: &str) -> Result<()> {
        if arg.is_empty() {
            output::print_error("Usage: export <dest>");
            return Ok(());
        }
        if self.session.discard().is_empty() {
            output::print_error("Discard list is empty, nothing to export");
            return Ok(());
        }
        let destination = Path::new(arg);
        if destination.exists()
            && !prompt_confirm(&format!("{} exists. Overwrite?", arg), Some(false))?
        {
            return Ok(());
        }
        self.session.export_discard(destination);
        self.wait();
        Ok(())
    }
}

/// One-based index from the user, checked against `len`.
fn parse_index(arg: &str, len: usize) -> Option<usize> {
    match arg.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        Ok(n) => {
            output::print_error(&format!("No entry {} (list has {})", n, len));
            None
        }
        Err(_) => {
            output::print_error("Expected a number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_is_one_based() {
        assert_eq!(parse_index("1", 3), Some(0));
        assert_eq!(parse_index("3", 3), Some(2));
    }

    #[test]
    fn test_parse_index_rejects_bad_input() {
        assert_eq!(parse_index("0", 3), None);
        assert_eq!(parse_index("4", 3), None);
        assert_eq!(parse_index("x", 3), None);
        assert_eq!(parse_index("1", 0), None);
    }
}
