use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Utc};
use tracing_subscriber::EnvFilter;

use mls_stats::batch::{BatchSummary, Steps, parse_years, run_batch};
use mls_stats::settings::Settings;
use mls_stats::{SourceKind, Statistics};

const USAGE: &str = "usage: mls_stats <stats|results|standings|all> [--year Y | --years A-B | --years A,B] [--fetch] [--convert] [--raw-dir P] [--data-dir P] [--json]";

#[derive(Debug)]
struct Args {
    sources: Vec<SourceKind>,
    years: Vec<u16>,
    steps: Steps,
    raw_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    json: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1).collect())?;

    let mut settings = Settings::from_env();
    if let Some(dir) = args.raw_dir {
        settings.raw_dir = dir;
    }
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }

    let mut summaries = Vec::new();
    for kind in &args.sources {
        let stats = Statistics::new(kind.config(), settings.clone());
        summaries.push(run_batch(&stats, &args.years, args.steps));
    }

    if args.json {
        let json = serde_json::to_string_pretty(&summaries).context("serialize summary")?;
        println!("{json}");
    } else {
        for summary in &summaries {
            print_summary(summary);
        }
    }

    let failed = summaries.iter().filter(|s| !s.is_success()).count();
    if failed > 0 {
        return Err(anyhow!("{failed} source(s) had failing years"));
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!("{} complete", summary.source);
    println!(
        "Years: {}/{}",
        summary.years_succeeded, summary.years_total
    );
    for path in &summary.raw_written {
        println!(" raw  {}", path.display());
    }
    for path in &summary.csv_written {
        println!(" csv  {}", path.display());
    }
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in &summary.errors {
            println!(" - {err}");
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<Args> {
    let mut sources = Vec::new();
    let mut years = Vec::new();
    let mut fetch = false;
    let mut convert = false;
    let mut raw_dir = None;
    let mut data_dir = None;
    let mut json = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, val)) if flag.starts_with("--") => (flag.to_string(), Some(val.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String> {
            inline
                .clone()
                .or_else(|| iter.next())
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{name} needs a value\n{USAGE}"))
        };
        match flag.as_str() {
            "--year" | "--years" => years.extend(parse_years(&value(&flag)?)?),
            "--fetch" => fetch = true,
            "--convert" => convert = true,
            "--raw-dir" => raw_dir = Some(PathBuf::from(value(&flag)?)),
            "--data-dir" => data_dir = Some(PathBuf::from(value(&flag)?)),
            "--json" => json = true,
            "-h" | "--help" => return Err(anyhow!(USAGE)),
            "all" => sources.extend(SourceKind::ALL),
            other if other.starts_with('-') => {
                return Err(anyhow!("unknown flag {other}\n{USAGE}"));
            }
            other => sources.push(other.parse::<SourceKind>()?),
        }
    }

    if sources.is_empty() {
        return Err(anyhow!("no source given\n{USAGE}"));
    }
    sources.dedup();
    if years.is_empty() {
        years.push(current_year()?);
    }
    let steps = if fetch || convert {
        Steps { fetch, convert }
    } else {
        Steps::BOTH
    };

    Ok(Args {
        sources,
        years,
        steps,
        raw_dir,
        data_dir,
        json,
    })
}

fn current_year() -> Result<u16> {
    u16::try_from(Utc::now().year()).context("current year out of range")
}
