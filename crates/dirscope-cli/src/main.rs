mod commands;
mod logging;
mod output;
mod progress;
mod shell;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use commands::{Cli, Commands};
use dirscope_core::{AppConfig, RecordProvider, ReportStore};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::error;

fn main() -> Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match dirscope_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let outcome = match args.command {
        Some(Commands::Summary { report }) => run_summary(&config, &report),
        Some(Commands::Ls { report, path }) => run_ls(&config, &report, path.as_deref()),
        Some(Commands::Top { report, limit }) => {
            let limit = limit.unwrap_or(config.top_files_limit);
            run_top(&config, &report, limit)
        }
        Some(Commands::Search {
            report,
            term,
            limit,
        }) => {
            let limit = limit.unwrap_or(config.search_limit);
            run_search(&config, &report, &term, limit)
        }
        Some(Commands::Explore { report }) => shell::Shell::new(config).run(report.as_deref()),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("{:#}", err);
        output::print_error(&format!("{:#}", err));
        process::exit(1);
    }
    Ok(())
}

fn load_store(config: &AppConfig, report: &Path) -> Result<ReportStore> {
    let store = ReportStore::new(config.clone());
    let reporter = CliReporter::new();
    store
        .parse_report(report, &reporter)
        .with_context(|| format!("Could not analyze report {}", report.display()))?;
    store.activate_report();
    Ok(store)
}

fn run_summary(config: &AppConfig, report: &Path) -> Result<()> {
    let store = load_store(config, report)?;
    let snapshot = store.snapshot()?;
    let diagnostics = store.diagnostics()?;
    output::print_summary(
        &snapshot.summary,
        Some(&diagnostics),
        snapshot.malformed_lines,
    );

    let roots = store.roots()?;
    if roots.len() > 1 {
        println!("Roots:");
        for root in roots {
            println!("  {:>10}  {}", output::human(root.size_bytes), root.path);
        }
    }
    Ok(())
}

fn run_ls(config: &AppConfig, report: &Path, path: Option<&str>) -> Result<()> {
    let store = load_store(config, report)?;
    let snapshot = store.snapshot()?;
    let path = path.unwrap_or(&snapshot.summary.root_path);
    if !store.has_directory(path)? {
        anyhow::bail!("'{}' is not a directory of this report", path);
    }

    let (dirs, files) = store.get_dir_content(path)?;
    let path_key = config.path_key();
    let breakdown = dirscope_core::breakdown::build_breakdown(
        &files,
        &dirs,
        &path_key,
        &config.files_bucket_label,
    );
    output::print_breakdown(path, &breakdown);
    println!();
    output::print_files(&files, false);
    Ok(())
}

fn run_top(config: &AppConfig, report: &Path, limit: usize) -> Result<()> {
    let store = load_store(config, report)?;
    let files = store.get_top_files(limit)?;
    output::print_files(&files, true);
    Ok(())
}

fn run_search(config: &AppConfig, report: &Path, term: &str, limit: usize) -> Result<()> {
    let store = load_store(config, report)?;
    let files = store.search_files(term, limit)?;
    output::print_files(&files, true);
    Ok(())
}

pub(crate) fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
