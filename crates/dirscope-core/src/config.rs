use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::path_key::PathKey;

/// Runtime settings. Every key is optional in the config file and the
/// environment; missing keys fall back to [`AppConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub separator: char,
    pub case_sensitive: bool,
    pub search_debounce_ms: u64,
    /// Terms shorter than this clear the results instead of querying.
    pub search_min_chars: usize,
    pub search_limit: usize,
    pub top_files_limit: usize,
    pub progress_every_lines: u64,
    pub notice_ttl_ms: u64,
    pub files_bucket_label: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            separator: '\\',
            case_sensitive: true,
            search_debounce_ms: 500,
            search_min_chars: 3,
            search_limit: 100,
            top_files_limit: 20,
            progress_every_lines: 50_000,
            notice_ttl_ms: 3_000,
            files_bucket_label: "[Direct files]".to_string(),
        }
    }
}

impl AppConfig {
    pub fn path_key(&self) -> PathKey {
        PathKey::new(self.separator, self.case_sensitive)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

/// Load `Dirscope.*` from the working directory (optional), then apply
/// `DIRSCOPE_*` environment overrides.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_configuration_from("Dirscope")
}

pub fn load_configuration_from(name: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(name).required(false))
        .add_source(Environment::with_prefix("DIRSCOPE").try_parsing(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
