//! Roster Pages - regenerate athlete profile pages
//!
//! Reads every athlete CSV in `mens_team/` and `womens_team/` under the site
//! root and writes the matching HTML page next to it. Athletes whose files
//! cannot be processed are listed at the end; the others are still built.
//!
//! Usage: roster-pages [--root <dir>] [--team men|women] [--report <csv>]

use anyhow::Result;
use clap::Parser;
use roster_pages::pipeline::{build_site, SiteConfig};
use roster_pages::roster::RosterTeam;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster-pages")]
#[command(about = "Generate athlete profile pages from roster CSV files")]
struct Cli {
    /// Site root containing mens_team/ and womens_team/
    #[arg(long, env = "ROSTER_ROOT", default_value = ".")]
    root: PathBuf,

    /// Only regenerate this team's pages (repeatable; default: both)
    #[arg(long = "team", value_name = "TEAM")]
    teams: Vec<RosterTeam>,

    /// Number of parallel threads (default: number of CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Write a per-athlete CSV report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Render pages without writing them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = SiteConfig::new(cli.root);
    if !cli.teams.is_empty() {
        config.teams = cli.teams;
        config.teams.sort();
        config.teams.dedup();
    }
    config.threads = cli.threads;
    config.dry_run = cli.dry_run;

    let report = build_site(&config)?;
    println!("{}", report.summary());

    if let Some(path) = &cli.report {
        report.write_report_csv(path)?;
        println!("Report written to {}", path.display());
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
