//! Team rosters and navigation menus
//!
//! Every profile page carries one menu per team listing all other athletes of
//! that team. Menus are derived from the team folder's file listing; file names
//! are the only join key between roster membership and links.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Extension of generated profile pages.
pub const PAGE_EXTENSION: &str = "html";
/// Extension of athlete source files.
pub const SOURCE_EXTENSION: &str = "csv";

/// One of the two rosters on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RosterTeam {
    Men,
    Women,
}

impl RosterTeam {
    /// Both teams, in menu order.
    pub const ALL: [RosterTeam; 2] = [RosterTeam::Men, RosterTeam::Women];

    /// Folder under the site root holding this team's CSV and HTML files.
    pub fn folder(&self) -> &'static str {
        match self {
            RosterTeam::Men => "mens_team",
            RosterTeam::Women => "womens_team",
        }
    }

    /// Summary text of the team's navigation menu.
    pub fn nav_title(&self) -> &'static str {
        match self {
            RosterTeam::Men => "Men's Roster",
            RosterTeam::Women => "Women's Roster",
        }
    }

    /// Relative prefix from any profile page to this team's pages.
    pub fn link_prefix(&self) -> String {
        format!("./../{}/", self.folder())
    }
}

impl fmt::Display for RosterTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterTeam::Men => write!(f, "men"),
            RosterTeam::Women => write!(f, "women"),
        }
    }
}

impl FromStr for RosterTeam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "men" | "mens" | "mens_team" => Ok(RosterTeam::Men),
            "women" | "womens" | "womens_team" => Ok(RosterTeam::Women),
            other => Err(format!("unknown team '{}' (expected 'men' or 'women')", other)),
        }
    }
}

/// A link to one peer profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLinkEntry {
    pub href: String,
    pub display_name: String,
}

lazy_static! {
    static ref TRAILING_DIGITS: Regex = Regex::new(r"[0-9]+$").unwrap();
}

/// Derive a menu label from a page file name.
///
/// Strips the extension, then one trailing run of digits (used to tell
/// same-named athletes apart): `janedoe2.html` -> `janedoe`. Digits elsewhere
/// are kept. A stem made only of digits is returned unchanged.
pub fn display_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let stripped = TRAILING_DIGITS.replace(stem, "");
    if stripped.is_empty() {
        stem.to_string()
    } else {
        stripped.into_owned()
    }
}

/// File name of the page generated from `source`, e.g. `jane.csv` -> `jane.html`.
pub fn page_file_name(source: &Path) -> Option<String> {
    let stem = source.file_stem()?.to_str()?;
    Some(format!("{}.{}", stem, PAGE_EXTENSION))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Pages match the lowercase extension exactly, the same spelling
/// [`page_file_name`] produces, so `Amy.HTML` never sits beside `Amy.html`.
fn is_page(path: &Path) -> bool {
    extension(path) == Some(PAGE_EXTENSION)
}

fn is_source(path: &Path) -> bool {
    extension(path)
        .map(|e| e.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}

/// Sorted page file names of one team, taken from a single directory scan.
///
/// A page counts as a roster member when its HTML file exists or when a CSV
/// in the same folder will produce it. Counting the projected pages keeps the
/// menus complete on a first run and independent of write order within a run.
#[derive(Debug, Clone)]
pub struct RosterIndex {
    team: RosterTeam,
    pages: BTreeSet<String>,
}

impl RosterIndex {
    /// Scan `dir` once. A missing or unreadable folder yields an empty roster.
    pub fn scan(dir: &Path, team: RosterTeam) -> Self {
        let mut pages = BTreeSet::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Cannot list roster folder {}: {}", dir.display(), e);
                }
                return Self { team, pages };
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                log::warn!("Skipping non UTF-8 file name in {}", dir.display());
                continue;
            };
            if is_page(&path) {
                pages.insert(file_name.to_string());
            } else if is_source(&path) {
                if let Some(page) = page_file_name(&path) {
                    pages.insert(page);
                }
            }
        }

        log::debug!("{} roster: {} pages in {}", team, pages.len(), dir.display());
        Self { team, pages }
    }

    /// Build an index from known page names, without touching the filesystem.
    pub fn from_pages<I, S>(team: RosterTeam, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            team,
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }

    /// Drop a page from the roster; returns whether it was listed.
    pub fn remove(&mut self, page: &str) -> bool {
        self.pages.remove(page)
    }

    pub fn team(&self) -> RosterTeam {
        self.team
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Links to every page of this roster, in file name order.
    pub fn all_links(&self) -> Vec<NavLinkEntry> {
        self.links_where(|_| true)
    }

    /// Links to every page of this roster except `current`, in file name order.
    pub fn links_excluding(&self, current: &str) -> Vec<NavLinkEntry> {
        self.links_where(|page| page != current)
    }

    fn links_where<F>(&self, keep: F) -> Vec<NavLinkEntry>
    where
        F: Fn(&str) -> bool,
    {
        let prefix = self.team.link_prefix();
        self.pages
            .iter()
            .filter(|page| keep(page.as_str()))
            .map(|page| NavLinkEntry {
                href: format!("{}{}", prefix, page),
                display_name: display_name(page),
            })
            .collect()
    }
}

/// Links to the peers of `current_file_name` in `roster_dir`.
///
/// Scans the folder on every call; batch builds should scan once with
/// [`RosterIndex::scan`] and reuse the index.
pub fn build_links(roster_dir: &Path, current_file_name: &str, team: RosterTeam) -> Vec<NavLinkEntry> {
    RosterIndex::scan(roster_dir, team).links_excluding(current_file_name)
}

/// The navigation menus shown on one page, one per team.
#[derive(Debug, Clone, Default)]
pub struct NavMenus {
    menus: Vec<(RosterTeam, Vec<NavLinkEntry>)>,
}

impl NavMenus {
    /// Menus for page `current` of team `current_team` from prebuilt indexes.
    ///
    /// Only the page's own roster leaves it out; a same-named page on the
    /// other team is a different athlete and stays listed.
    pub fn for_page(indexes: &[RosterIndex], current_team: RosterTeam, current: &str) -> Self {
        Self {
            menus: indexes
                .iter()
                .map(|index| {
                    let links = if index.team() == current_team {
                        index.links_excluding(current)
                    } else {
                        index.all_links()
                    };
                    (index.team(), links)
                })
                .collect(),
        }
    }

    /// Links for `team`; empty when no menu was built for it.
    pub fn links(&self, team: RosterTeam) -> &[NavLinkEntry] {
        self.menus
            .iter()
            .find(|(t, _)| *t == team)
            .map(|(_, links)| links.as_slice())
            .unwrap_or(&[])
    }
}
