use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_RAW_DIR: &str = "raw";
pub const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding fetched HTML pages.
    pub raw_dir: PathBuf,
    /// Directory receiving converted CSV files.
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
    /// Write the body of non-2xx responses instead of failing the fetch.
    pub keep_error_pages: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            keep_error_pages: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());
        let defaults = Self::default();

        let raw_dir = get("MLS_RAW_DIR")
            .map(|val| PathBuf::from(val.trim()))
            .unwrap_or(defaults.raw_dir);
        let data_dir = get("MLS_DATA_DIR")
            .map(|val| PathBuf::from(val.trim()))
            .unwrap_or(defaults.data_dir);
        let timeout_secs = get("MLS_HTTP_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        let keep_error_pages = get("MLS_KEEP_ERROR_PAGES")
            .map(|val| parse_flag(&val))
            .unwrap_or(defaults.keep_error_pages);

        Self {
            raw_dir,
            data_dir,
            request_timeout: Duration::from_secs(timeout_secs),
            keep_error_pages,
        }
    }

    pub fn with_dirs(mut self, raw_dir: &Path, data_dir: &Path) -> Self {
        self.raw_dir = raw_dir.to_path_buf();
        self.data_dir = data_dir.to_path_buf();
        self
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
