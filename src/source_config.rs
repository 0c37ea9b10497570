use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

use crate::fixup::Fixup;

/// One scrape target on mlssoccer.com.
///
/// Every template carries a single `{}` that is replaced by the season year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: &'static str,
    pub raw_file_template: &'static str,
    pub data_file_template: &'static str,
    pub url_template: &'static str,
    pub table_index: &'static str,
    pub fixup: Fixup,
    /// The page builds its table client-side, so the fetched HTML may not
    /// contain it.
    pub dynamic_content: bool,
}

pub static TEAM_STATS: SourceConfig = SourceConfig {
    name: "team-stats",
    raw_file_template: "team-{}-reg.html",
    data_file_template: "team-stats-{}.csv",
    url_template: "https://www.mlssoccer.com/stats/team?year={}&season_type=REG",
    table_index: "Club",
    fixup: Fixup::NoOp,
    dynamic_content: false,
};

pub static TEAM_RESULTS: SourceConfig = SourceConfig {
    name: "team-results",
    raw_file_template: "team-results-{}.html",
    data_file_template: "team-results-{}.csv",
    url_template: "https://www.mlssoccer.com/results/{}",
    table_index: "Club",
    fixup: Fixup::NoOp,
    dynamic_content: true,
};

pub static TEAM_STANDINGS: SourceConfig = SourceConfig {
    name: "team-standings-ss",
    raw_file_template: "team-standings-ss-{}.html",
    data_file_template: "team-standings-ss-{}.csv",
    url_template: "https://www.mlssoccer.com/standings/supporters-shield/{}/",
    table_index: "#",
    fixup: Fixup::Standings,
    dynamic_content: false,
};

impl SourceConfig {
    pub fn source_url(&self, year: impl fmt::Display) -> String {
        fill_year(self.url_template, year)
    }

    pub fn raw_file_name(&self, year: impl fmt::Display) -> String {
        fill_year(self.raw_file_template, year)
    }

    pub fn data_file_name(&self, year: impl fmt::Display) -> String {
        fill_year(self.data_file_template, year)
    }
}

/// Replaces the first `{}` in `template` with `year`.
pub fn fill_year(template: &str, year: impl fmt::Display) -> String {
    template.replacen("{}", &year.to_string(), 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    TeamStats,
    TeamResults,
    TeamStandings,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::TeamStats,
        SourceKind::TeamResults,
        SourceKind::TeamStandings,
    ];

    pub fn config(self) -> &'static SourceConfig {
        match self {
            SourceKind::TeamStats => &TEAM_STATS,
            SourceKind::TeamResults => &TEAM_RESULTS,
            SourceKind::TeamStandings => &TEAM_STANDINGS,
        }
    }

    pub fn name(self) -> &'static str {
        self.config().name
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stats" | "team-stats" => Ok(SourceKind::TeamStats),
            "results" | "team-results" => Ok(SourceKind::TeamResults),
            "standings" | "team-standings" | "team-standings-ss" => Ok(SourceKind::TeamStandings),
            other => Err(anyhow!(
                "unknown source {other:?} (expected stats, results or standings)"
            )),
        }
    }
}
