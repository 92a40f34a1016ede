//! Site build pipeline for programmatic use by the CLI and tests.
//!
//! Discovers athlete CSVs per team, renders every page and writes it next to
//! its source. Failures are isolated per athlete and collected in a
//! [`BuildReport`] instead of aborting the run.

use crate::athlete::{read_athlete_csv, ParsedAthlete};
use crate::error::{ErrorKind, RosterError};
use crate::render::render_page;
use crate::roster::{page_file_name, NavMenus, RosterIndex, RosterTeam, SOURCE_EXTENSION};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::fmt::Write;
use std::fs::File;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a site build.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Site root holding the team folders and `images/profiles/`
    pub root: PathBuf,
    /// Teams whose pages are (re)generated. Menus always cover both teams.
    pub teams: Vec<RosterTeam>,
    /// Number of worker threads (default: rayon's global pool)
    pub threads: Option<usize>,
    /// Render everything but write nothing
    pub dry_run: bool,
}

impl SiteConfig {
    /// Build both teams under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            teams: RosterTeam::ALL.to_vec(),
            threads: None,
            dry_run: false,
        }
    }

    pub fn team_dir(&self, team: RosterTeam) -> PathBuf {
        self.root.join(team.folder())
    }

    /// On-disk location of the picture a page for `athlete_id` will reference.
    pub fn profile_image(&self, athlete_id: &str) -> PathBuf {
        self.root
            .join("images")
            .join("profiles")
            .join(format!("{}.jpg", athlete_id))
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Non-fatal finding attached to a generated page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageWarning {
    /// Profile picture absent at build time; the page falls back when viewed.
    MissingAsset { path: PathBuf },
    /// Row kept as a race although it has no time and no meet.
    SuspectRow { line: u64 },
}

impl fmt::Display for PageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageWarning::MissingAsset { path } => {
                write!(f, "missing profile image {}", path.display())
            }
            PageWarning::SuspectRow { line } => {
                write!(f, "line {} classified as race without time or meet", line)
            }
        }
    }
}

/// What happened to one athlete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Generated,
    Failed { kind: ErrorKind, message: String },
}

/// Result of processing one athlete CSV.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub team: RosterTeam,
    pub source: PathBuf,
    pub output: PathBuf,
    pub outcome: PageOutcome,
    pub warnings: Vec<PageWarning>,
}

impl PageResult {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PageOutcome::Failed { .. })
    }
}

/// Everything a site build did, in team then file name order.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub pages: Vec<PageResult>,
    /// Teams that contributed no pages because their folder is unusable
    pub skipped_teams: Vec<(RosterTeam, String)>,
    pub dry_run: bool,
}

#[derive(Serialize)]
struct ReportRow<'a> {
    team: String,
    source: String,
    output: String,
    status: &'a str,
    detail: String,
}

impl BuildReport {
    pub fn generated(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_failed()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|p| p.is_failed())
    }

    pub fn has_failures(&self) -> bool {
        self.pages.iter().any(|p| p.is_failed())
    }

    pub fn warning_count(&self) -> usize {
        self.pages.iter().map(|p| p.warnings.len()).sum()
    }

    /// Human-readable summary ending with the list of failed athletes.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Roster build complete{}:\n  Pages generated: {}\n  Pages failed: {}\n  Warnings: {}",
            if self.dry_run { " (dry run, nothing written)" } else { "" },
            self.generated(),
            self.failed().count(),
            self.warning_count()
        );

        for (team, reason) in &self.skipped_teams {
            let _ = write!(out, "\n  Skipped {} roster: {}", team, reason);
        }

        if self.has_failures() {
            out.push_str("\nFailed athletes:");
            for page in self.failed() {
                if let PageOutcome::Failed { kind, message } = &page.outcome {
                    let _ = write!(
                        out,
                        "\n  {} ({}): {}",
                        page.source.display(),
                        kind.as_str(),
                        message
                    );
                }
            }
        }

        out
    }

    /// Write one CSV row per athlete to `path`.
    pub fn write_report_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create report CSV: {}", path.display()))?;

        for page in &self.pages {
            let (status, detail) = match &page.outcome {
                PageOutcome::Generated => (
                    "generated",
                    page.warnings
                        .iter()
                        .map(|w| w.to_string())
                        .collect::<Vec<_>>()
                        .join("; "),
                ),
                PageOutcome::Failed { kind, message } => (kind.as_str(), message.clone()),
            };
            writer.serialize(ReportRow {
                team: page.team.to_string(),
                source: page.source.display().to_string(),
                output: page.output.display().to_string(),
                status,
                detail,
            })?;
        }

        writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// Build
// ============================================================================

/// One athlete's source and destination.
#[derive(Debug, Clone)]
struct PageJob {
    team: RosterTeam,
    source: PathBuf,
    output: PathBuf,
    page_name: String,
}

/// A parsed athlete whose output is already open for writing.
struct PreparedPage {
    parsed: ParsedAthlete,
    /// `None` in dry-run mode
    file: Option<File>,
}

/// Sorted CSV files directly inside `dir`.
pub fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list roster folder: {}", dir.display()))?;

    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in {}", dir.display()))?
            .path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(SOURCE_EXTENSION))
            .unwrap_or(false);
        if is_csv && path.is_file() {
            sources.push(path);
        }
    }

    sources.sort();
    Ok(sources)
}

/// Generate every configured team's pages.
///
/// Roster listings are taken once per team before any page is written, so
/// pages can be produced in parallel and all see the same menus. Athletes
/// whose CSV fails to parse, or whose page cannot be opened for writing, are
/// left out of the menus unless a page from an earlier run is still there.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let indexes: Vec<RosterIndex> = RosterTeam::ALL
        .iter()
        .map(|team| RosterIndex::scan(&config.team_dir(*team), *team))
        .collect();

    let mut report = BuildReport {
        dry_run: config.dry_run,
        ..Default::default()
    };
    let mut jobs = Vec::new();

    for team in &config.teams {
        let dir = config.team_dir(*team);
        if !dir.is_dir() {
            log::warn!("{} roster folder {} not found", team, dir.display());
            report
                .skipped_teams
                .push((*team, format!("folder {} not found", dir.display())));
            continue;
        }

        let sources = match discover_sources(&dir) {
            Ok(sources) => sources,
            Err(e) => {
                log::error!("{:#}", e);
                report.skipped_teams.push((*team, format!("{:#}", e)));
                continue;
            }
        };
        log::info!("{} roster: {} athlete files", team, sources.len());

        for source in sources {
            let Some(page_name) = page_file_name(&source) else {
                log::warn!("Skipping {}: file name is not UTF-8", source.display());
                continue;
            };
            jobs.push(PageJob {
                team: *team,
                output: source.with_file_name(&page_name),
                source,
                page_name,
            });
        }
    }

    let run = || -> Vec<PageResult> {
        // Parse and open every output first so athletes that cannot be built
        // are not linked from their peers' menus.
        let prepared: Vec<(bool, Result<PreparedPage, RosterError>)> = jobs
            .par_iter()
            .map(|job| (job.output.is_file(), prepare_page(job, config)))
            .collect();

        let mut indexes = indexes;
        for (job, (had_page, result)) in jobs.iter().zip(&prepared) {
            if result.is_err() && !had_page {
                if let Some(index) = indexes.iter_mut().find(|i| i.team() == job.team) {
                    index.remove(&job.page_name);
                }
            }
        }

        jobs.par_iter()
            .zip(prepared.into_par_iter())
            .map(|(job, (_, result))| generate_page(job, result, &indexes, config))
            .collect()
    };
    report.pages = match config.threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("Failed to build thread pool")?
            .install(run),
        None => run(),
    };

    Ok(report)
}

fn prepare_page(job: &PageJob, config: &SiteConfig) -> Result<PreparedPage, RosterError> {
    let parsed = read_athlete_csv(&job.source)?;
    let file = if config.dry_run {
        None
    } else {
        let file = File::create(&job.output).map_err(|source| RosterError::Filesystem {
            path: job.output.clone(),
            source,
        })?;
        Some(file)
    };
    Ok(PreparedPage { parsed, file })
}

fn generate_page(
    job: &PageJob,
    prepared: Result<PreparedPage, RosterError>,
    indexes: &[RosterIndex],
    config: &SiteConfig,
) -> PageResult {
    let mut warnings = Vec::new();

    let outcome = match prepared.and_then(|p| write_page(job, p, indexes, config, &mut warnings)) {
        Ok(()) => {
            log::info!("Generated {}", job.output.display());
            PageOutcome::Generated
        }
        Err(e) => {
            log::error!("Skipping {}: {}", job.source.display(), e);
            PageOutcome::Failed {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    };

    PageResult {
        team: job.team,
        source: job.source.clone(),
        output: job.output.clone(),
        outcome,
        warnings,
    }
}

fn write_page(
    job: &PageJob,
    prepared: PreparedPage,
    indexes: &[RosterIndex],
    config: &SiteConfig,
    warnings: &mut Vec<PageWarning>,
) -> Result<(), RosterError> {
    let PreparedPage { parsed, file } = prepared;
    let record = parsed.record;

    warnings.extend(
        parsed
            .suspect_rows
            .into_iter()
            .map(|line| PageWarning::SuspectRow { line }),
    );

    let image = config.profile_image(&record.athlete_id);
    if !image.is_file() {
        log::warn!(
            "No profile image for {} ({}), page will show the placeholder",
            record.name,
            image.display()
        );
        warnings.push(PageWarning::MissingAsset { path: image });
    }

    let nav = NavMenus::for_page(indexes, job.team, &job.page_name);
    let html = render_page(&record, &nav);

    if let Some(mut file) = file {
        file.write_all(html.as_bytes())
            .map_err(|source| RosterError::Filesystem {
                path: job.output.clone(),
                source,
            })?;
    }
    Ok(())
}
