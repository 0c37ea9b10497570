use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::warn;

use crate::statistics::Statistics;

/// Which pipeline steps to run for each year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Steps {
    pub fetch: bool,
    pub convert: bool,
}

impl Steps {
    pub const BOTH: Steps = Steps {
        fetch: true,
        convert: true,
    };
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub source: String,
    pub years_total: usize,
    pub years_succeeded: usize,
    pub raw_written: Vec<PathBuf>,
    pub csv_written: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs `steps` for every year in order. A failing year is recorded and the
/// batch moves on; when fetch fails, convert is skipped for that year.
pub fn run_batch(stats: &Statistics, years: &[u16], steps: Steps) -> BatchSummary {
    let mut summary = BatchSummary {
        source: stats.config().name.to_string(),
        years_total: years.len(),
        ..BatchSummary::default()
    };

    for &year in years {
        let mut ok = true;
        if steps.fetch {
            match stats.fetch_raw(year) {
                Ok(report) => summary.raw_written.push(report.raw_path),
                Err(err) => {
                    warn!(source = %summary.source, year, "fetch failed: {err:#}");
                    summary.errors.push(format!("{year}: {err:#}"));
                    ok = false;
                }
            }
        }
        if ok && steps.convert {
            match stats.convert_raw_to_csv(year) {
                Ok(report) => summary.csv_written.push(report.data_path),
                Err(err) => {
                    warn!(source = %summary.source, year, "convert failed: {err:#}");
                    summary.errors.push(format!("{year}: {err:#}"));
                    ok = false;
                }
            }
        }
        if ok {
            summary.years_succeeded += 1;
        }
    }

    summary
}

/// Parses `2019`, `2015-2019` or `2015,2017,2019` (mixed forms allowed) into
/// a list of years, keeping first-seen order and dropping duplicates.
pub fn parse_years(raw: &str) -> Result<Vec<u16>> {
    let mut out = Vec::new();
    for part in raw.split([',', ';', ' ']).map(str::trim) {
        if part.is_empty() {
            continue;
        }
        if let Some((start, end)) = part.split_once('-') {
            let start = parse_year(start)?;
            let end = parse_year(end)?;
            if start > end {
                return Err(anyhow!("year range {part} runs backwards"));
            }
            out.extend(start..=end);
        } else {
            out.push(parse_year(part)?);
        }
    }
    if out.is_empty() {
        return Err(anyhow!("no years in {raw:?}"));
    }

    let mut seen = HashSet::new();
    out.retain(|year| seen.insert(*year));
    Ok(out)
}

fn parse_year(raw: &str) -> Result<u16> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| anyhow!("invalid year {raw:?}"))
}
