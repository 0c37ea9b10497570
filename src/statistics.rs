use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use crate::frame::{IndexedFrame, table_to_frame};
use crate::html_table::first_table;
use crate::http_client::http_client;
use crate::persist::write_atomic;
use crate::settings::Settings;
use crate::source_config::SourceConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub url: String,
    pub raw_path: PathBuf,
    pub status: u16,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    pub raw_path: PathBuf,
    pub data_path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Fetch and convert steps for one source, bound to a set of directories.
#[derive(Debug, Clone)]
pub struct Statistics {
    config: &'static SourceConfig,
    settings: Settings,
}

impl Statistics {
    pub fn new(config: &'static SourceConfig, settings: Settings) -> Self {
        Self { config, settings }
    }

    pub fn config(&self) -> &'static SourceConfig {
        self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn source_url(&self, year: impl fmt::Display) -> String {
        self.config.source_url(year)
    }

    pub fn raw_path(&self, year: impl fmt::Display) -> PathBuf {
        self.settings.raw_dir.join(self.config.raw_file_name(year))
    }

    pub fn data_path(&self, year: impl fmt::Display) -> PathBuf {
        self.settings.data_dir.join(self.config.data_file_name(year))
    }

    /// Downloads the page for `year` and stores the body verbatim at
    /// [`Statistics::raw_path`].
    pub fn fetch_raw(&self, year: impl fmt::Display) -> Result<FetchReport> {
        let year = year.to_string();
        let url = self.source_url(&year);
        let raw_path = self.raw_path(&year);
        if self.config.dynamic_content {
            warn!(source = self.config.name, %url, "page renders its table client-side; raw html may not contain it");
        }

        let client = http_client(self.settings.request_timeout)?;
        debug!(source = self.config.name, %url, "fetching");
        let resp = client
            .get(&url)
            .send()
            .with_context(|| format!("request {url} failed"))?;
        let status = resp.status();
        let body = resp
            .text()
            .with_context(|| format!("failed reading body from {url}"))?;

        if !status.is_success() {
            if !self.settings.keep_error_pages {
                return Err(anyhow!("http {status} from {url}"));
            }
            warn!(source = self.config.name, %url, %status, "keeping error page body");
        }

        write_atomic(&raw_path, body.as_bytes())
            .with_context(|| format!("store raw html {}", raw_path.display()))?;
        info!(
            source = self.config.name,
            %url,
            path = %raw_path.display(),
            bytes = body.len(),
            "raw page stored"
        );

        Ok(FetchReport {
            url,
            raw_path,
            status: status.as_u16(),
            bytes: body.len(),
        })
    }

    /// Reads the stored page for `year`, extracts its first table and writes
    /// it as CSV to [`Statistics::data_path`]. Nothing is written on failure.
    pub fn convert_raw_to_csv(&self, year: impl fmt::Display) -> Result<ConvertReport> {
        let year = year.to_string();
        let raw_path = self.raw_path(&year);
        let data_path = self.data_path(&year);

        let html = fs::read_to_string(&raw_path)
            .with_context(|| format!("read raw html {}", raw_path.display()))?;
        let frame = self
            .convert_html(&html)
            .with_context(|| format!("convert {}", raw_path.display()))?;
        let csv = frame.to_csv_bytes()?;
        write_atomic(&data_path, &csv)
            .with_context(|| format!("write csv {}", data_path.display()))?;

        info!(
            source = self.config.name,
            path = %data_path.display(),
            rows = frame.len(),
            columns = frame.columns.len(),
            "csv written"
        );

        Ok(ConvertReport {
            raw_path,
            data_path,
            rows: frame.len(),
            columns: frame.columns.len(),
        })
    }

    /// Runs the extraction on an in-memory page: first table, fixup,
    /// conversion, then the key column becomes the index.
    pub fn convert_html(&self, html: &str) -> Result<IndexedFrame> {
        let mut table = first_table(html)?;
        self.config.fixup.apply(&mut table);
        let frame = table_to_frame(&table)?;
        if frame.rows.is_empty() && self.config.dynamic_content {
            warn!(source = self.config.name, "table has no data rows");
        }
        let indexed = frame.set_index(self.config.table_index)?;
        Ok(indexed)
    }
}
