use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dirscope")]
#[command(about = "Browse, search and plan clean-ups from a disk usage report", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print totals and data-quality checks for a report
    Summary {
        /// Report file (.txt)
        report: PathBuf,
    },
    /// Show the size breakdown and files of one directory
    Ls {
        report: PathBuf,
        /// Directory to show; defaults to the report root
        path: Option<String>,
    },
    /// List the largest files in the report
    Top {
        report: PathBuf,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Find files whose name or folder contains a term
    Search {
        report: PathBuf,
        term: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Interactive shell: navigate, search and build a discard list
    Explore {
        /// Report to open on start
        report: Option<PathBuf>,
    },
    /// Print configuration values
    PrintConfig,
}
