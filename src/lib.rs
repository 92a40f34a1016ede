//! Roster Pages
//!
//! Static athlete profile pages for a two-team roster website.
//!
//! This library provides:
//! - `athlete`: positional athlete CSV parsing into `AthleteRecord`
//! - `roster`: team folders, roster listings and navigation menus
//! - `render`: the HTML profile page template
//! - `pipeline`: whole-site builds with per-athlete failure isolation
//!
//! Binaries:
//! - `roster-pages`: regenerate every profile page from the team folders

pub mod athlete;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod roster;

pub use athlete::{parse_athlete_csv, AthleteRecord, RaceResult, SeasonRecord};
pub use error::{ErrorKind, RosterError};
pub use pipeline::{build_site, BuildReport, SiteConfig};
pub use render::render_page;
pub use roster::{build_links, NavLinkEntry, NavMenus, RosterIndex, RosterTeam};
