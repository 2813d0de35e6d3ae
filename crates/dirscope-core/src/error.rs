use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Unsupported report '{0}': only .txt reports can be loaded")]
    UnsupportedReport(String),

    #[error("Report parse error: {0}")]
    Parse(String),

    #[error("No report loaded")]
    NotLoaded,

    #[error("A report is already being loaded")]
    LoadInProgress,

    #[error("'{0}' has no parent directory")]
    NoParent(String),

    #[error("Index {index} out of range for {len} entries")]
    OutOfRange { index: usize, len: usize },

    #[error("{0}")]
    Other(String),
}
