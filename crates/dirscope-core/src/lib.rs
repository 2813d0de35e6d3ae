pub mod breakdown;
pub mod config;
pub mod discard;
pub mod dispatch;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod navigation;
pub mod notice;
pub mod path_key;
pub mod progress;
pub mod provider;
pub mod report;
pub mod search;
pub mod session;
pub mod store;
pub mod top_k;

pub use config::AppConfig;
pub use error::Error;
pub use model::{AnalysisSummary, BreakdownItem, BreakdownKind, DirRecord, FileRecord};
pub use path_key::PathKey;
pub use progress::{LoadProgress, ProgressReporter, SilentReporter};
pub use provider::RecordProvider;
pub use session::Session;
pub use store::ReportStore;
