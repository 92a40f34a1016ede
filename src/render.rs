//! HTML page rendering
//!
//! One parameterized template produces every profile page. All text that
//! originates in a CSV is escaped before it reaches the markup.

use crate::athlete::{AthleteRecord, RaceResult, SeasonRecord};
use crate::roster::{NavLinkEntry, NavMenus, RosterTeam};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fmt::Write;

/// Glyph standing in for the `SR` token.
pub const SCHOOL_RECORD_MARKER: &str =
    r#"<i class="fas fa-star record-marker" title="School Record" aria-label="School Record"></i>"#;
/// Glyph standing in for the `PR` token.
pub const PERSONAL_RECORD_MARKER: &str =
    r#"<i class="fas fa-medal record-marker" title="Personal Record" aria-label="Personal Record"></i>"#;

/// Folder of profile pictures, relative to a profile page.
pub const PROFILE_IMAGE_DIR: &str = "../images/profiles";
/// Picture shown when an athlete has none.
pub const DEFAULT_PROFILE_IMAGE: &str = "../images/profiles/default.jpg";

lazy_static! {
    static ref RECORD_TOKEN: Regex = Regex::new("SR|PR").unwrap();
}

/// Escape text for use in element content and quoted attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape `s` and replace every `SR`/`PR` with its marker glyph.
///
/// Matching is exact and case-sensitive with no word boundaries, so `PRO`
/// also gets a marker. Replacement happens in one pass; marker markup is never
/// rescanned.
pub fn substitute_markers(s: &str) -> String {
    let escaped = html_escape(s);
    RECORD_TOKEN
        .replace_all(&escaped, |caps: &Captures| -> String {
            match &caps[0] {
                "SR" => SCHOOL_RECORD_MARKER.to_string(),
                _ => PERSONAL_RECORD_MARKER.to_string(),
            }
        })
        .into_owned()
}

/// Link target for a meet URL, with script-capable schemes neutralized.
fn safe_href(url: &str) -> String {
    let trimmed = url.trim();
    let scheme_end = trimmed.find(':');
    let path_start = trimmed.find(|c: char| c == '/' || c == '?' || c == '#');
    let has_scheme = match (scheme_end, path_start) {
        (Some(colon), Some(slash)) => colon < slash,
        (Some(_), None) => true,
        _ => false,
    };
    if has_scheme {
        let scheme = trimmed[..scheme_end.unwrap_or(0)].to_ascii_lowercase();
        if !matches!(scheme.as_str(), "http" | "https" | "mailto") {
            log::warn!("Dropping meet link with '{}' scheme", scheme);
            return "#".to_string();
        }
    }
    html_escape(trimmed)
}

/// Path of an athlete's profile picture, relative to their page.
pub fn profile_image_path(athlete_id: &str) -> String {
    format!("{}/{}.jpg", PROFILE_IMAGE_DIR, athlete_id)
}

/// Render the complete profile page for one athlete.
pub fn render_page(record: &AthleteRecord, nav: &NavMenus) -> String {
    let name = html_escape(&record.name);

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <script src="https://kit.fontawesome.com/YOUR_ID.js" crossorigin="anonymous"></script>
    <link rel="stylesheet" href="../css/reset.css">
    <link rel="stylesheet" href="../css/style.css">
    <title>{name}</title>
</head>
<body data-theme="light">
    <a href="#main" class="skip-link">Skip to Main Content</a>

    <div class="theme-toggle-icons">
        <button onclick="setTheme('light')" title="Light Mode"><i class="fas fa-sun"></i></button>
        <button onclick="setTheme('dark')" title="Dark Mode"><i class="fas fa-moon"></i></button>
        <button onclick="setTheme('high-contrast')" title="High Contrast"><i class="fas fa-adjust"></i></button>
    </div>

{nav}
{header}
    <main id="main">
{season_table}
{race_table}
        <section id="gallery">
            <h2 class="section-title">Gallery</h2>
        </section>
    </main>

{footer}
    <script src="../js/site.js"></script>
</body>
</html>
"##,
        name = name,
        nav = render_nav(nav),
        header = render_header(record),
        season_table = render_season_table(&record.season_records),
        race_table = render_race_table(&record.race_results),
        footer = render_footer(),
    )
}

fn render_nav(nav: &NavMenus) -> String {
    let mut menus = String::new();
    for team in RosterTeam::ALL {
        let _ = writeln!(
            menus,
            "            <li>{}</li>",
            render_team_menu(team, nav.links(team))
        );
    }

    format!(
        r#"    <nav>
        <ul>
            <li><a href="./../index.html">Home Page</a></li>
{menus}        </ul>
    </nav>
"#,
        menus = menus
    )
}

fn render_team_menu(team: RosterTeam, links: &[NavLinkEntry]) -> String {
    let mut out = format!(
        "<details><summary>{}</summary>",
        html_escape(team.nav_title())
    );
    for link in links {
        let _ = write!(
            out,
            "\n                <a href=\"{}\">{}</a><br>",
            html_escape(&link.href),
            html_escape(&link.display_name)
        );
    }
    out.push_str("\n            </details>");
    out
}

fn render_header(record: &AthleteRecord) -> String {
    let name = html_escape(&record.name);
    let image = html_escape(&profile_image_path(&record.athlete_id));

    // onerror resets itself so a missing placeholder cannot loop
    format!(
        r#"    <header class="sticky-header">
        <h1>{name}</h1>
        <img src="{image}" alt="Profile picture of {name}" class="athlete-profile" onerror="this.onerror=null;this.src='{fallback}';">
    </header>
"#,
        name = name,
        image = image,
        fallback = DEFAULT_PROFILE_IMAGE,
    )
}

fn render_season_table(records: &[SeasonRecord]) -> String {
    let mut rows = String::new();
    for sr in records {
        let _ = write!(
            rows,
            r#"
                    <tr>
                        <td>{}</td>
                        <td>{}</td>
                    </tr>"#,
            html_escape(&sr.year),
            substitute_markers(&sr.value)
        );
    }
    if records.is_empty() {
        rows.push_str(
            r#"
                    <tr class="empty-row"><td colspan="2">No season records yet</td></tr>"#,
        );
    }

    format!(
        r#"        <section id="athlete-sr-table" class="table-container">
            <h2 class="section-title">Athlete's Seasonal Records (SR) per Year</h2>
            <table>
                <thead>
                    <tr>
                        <th>Year</th>
                        <th>Season Record (SR)</th>
                    </tr>
                </thead>
                <tbody>{rows}
                </tbody>
            </table>
        </section>
"#,
        rows = rows
    )
}

fn render_race_table(races: &[RaceResult]) -> String {
    let mut rows = String::new();
    for race in races {
        let _ = write!(
            rows,
            r#"
                    <tr class="result-row">
                        <td><a href="{}">{}</a></td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                    </tr>"#,
            safe_href(&race.meet_url),
            html_escape(&race.meet_name),
            substitute_markers(&race.time),
            html_escape(&race.place),
            html_escape(&race.comments)
        );
    }
    if races.is_empty() {
        rows.push_str(
            r#"
                    <tr class="empty-row"><td colspan="4">No race results yet</td></tr>"#,
        );
    }

    format!(
        r#"        <section id="athlete-result-table" class="table-container">
            <h2 class="section-title">Race Results</h2>
            <table id="athlete-table">
                <thead>
                    <tr>
                        <th>Race</th>
                        <th>Athlete Time</th>
                        <th>Athlete Place</th>
                        <th>Race Comments</th>
                    </tr>
                </thead>
                <tbody>{rows}
                </tbody>
            </table>
        </section>
"#,
        rows = rows
    )
}

fn render_footer() -> &'static str {
    r#"    <footer>
        <p>Skyline High School</p>
        <address>
            2552 North Maple Road<br>
            Ann Arbor, MI 48103
        </address>
        <p>
            <a href="https://sites.google.com/aaps.k12.mi.us/skylinecrosscountry2021/home">XC Skyline Page</a><br>
            Follow us on Instagram <a href="https://www.instagram.com/a2skylinexc/"><i class="fa-brands fa-instagram" aria-label="Instagram"></i></a>
        </p>
    </footer>"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterIndex;

    fn sample_record() -> AthleteRecord {
        AthleteRecord {
            name: "Jane Doe".to_string(),
            athlete_id: "9981".to_string(),
            season_records: vec![
                SeasonRecord {
                    year: "2022".to_string(),
                    value: "18:40.2".to_string(),
                },
                SeasonRecord {
                    year: "2023".to_string(),
                    value: "18:01.0 SR".to_string(),
                },
            ],
            race_results: vec![
                RaceResult {
                    place: "1".to_string(),
                    time: "18:01.0 PR".to_string(),
                    meet_name: "Holly Invite".to_string(),
                    meet_url: "https://example.com/holly".to_string(),
                    comments: "great kick".to_string(),
                },
                RaceResult {
                    place: "4".to_string(),
                    time: "18:30.5".to_string(),
                    meet_name: "Regionals".to_string(),
                    meet_url: "https://example.com/reg".to_string(),
                    comments: String::new(),
                },
            ],
        }
    }

    fn sample_nav() -> NavMenus {
        let indexes = [
            RosterIndex::from_pages(RosterTeam::Men, ["john1.html", "john2.html"]),
            RosterIndex::from_pages(RosterTeam::Women, ["jane_doe.html", "kim.html"]),
        ];
        NavMenus::for_page(&indexes, RosterTeam::Women, "jane_doe.html")
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_substitute_markers_every_occurrence() {
        let out = substitute_markers("SR SR");
        assert_eq!(out.matches(SCHOOL_RECORD_MARKER).count(), 2);
        assert!(!out.contains("SR "));

        let out = substitute_markers("17:59.9 PR SR");
        assert_eq!(out.matches(PERSONAL_RECORD_MARKER).count(), 1);
        assert_eq!(out.matches(SCHOOL_RECORD_MARKER).count(), 1);
        assert!(out.starts_with("17:59.9 "));
    }

    #[test]
    fn test_substitute_markers_case_sensitive_substring() {
        assert_eq!(substitute_markers("sr pr"), "sr pr");
        // No word boundaries: PRO gets a marker followed by O
        assert_eq!(
            substitute_markers("PRO"),
            format!("{}O", PERSONAL_RECORD_MARKER)
        );
        assert_eq!(substitute_markers("16:00 <SR>"), format!("16:00 &lt;{}&gt;", SCHOOL_RECORD_MARKER));
    }

    #[test]
    fn test_safe_href() {
        assert_eq!(safe_href("https://example.com/a?b=1&c=2"), "https://example.com/a?b=1&amp;c=2");
        assert_eq!(safe_href("results/meet.html"), "results/meet.html");
        assert_eq!(safe_href("javascript:alert(1)"), "#");
        assert_eq!(safe_href(" JavaScript:alert(1)"), "#");
        assert_eq!(safe_href("/page?time=10:30"), "/page?time=10:30");
        assert_eq!(safe_href(""), "");
    }

    #[test]
    fn test_render_page_structure() {
        let html = render_page(&sample_record(), &sample_nav());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(html.contains("<title>Jane Doe</title>"));
        assert!(html.contains("<h1>Jane Doe</h1>"));
        assert!(html.contains(r#"href="./../index.html""#));
        assert!(html.contains("<summary>Men&#39;s Roster</summary>"));
        assert!(html.contains("<summary>Women&#39;s Roster</summary>"));
        assert_eq!(html.matches("<details>").count(), 2);
        assert_eq!(html.matches("<tr class=\"result-row\">").count(), 2);
        assert!(html.contains(r#"<td><a href="https://example.com/holly">Holly Invite</a></td>"#));
        assert!(html.contains(SCHOOL_RECORD_MARKER));
        assert!(html.contains(PERSONAL_RECORD_MARKER));
        assert!(!html.contains("No race results yet"));
    }

    #[test]
    fn test_render_nav_excludes_current_page() {
        let html = render_page(&sample_record(), &sample_nav());
        assert!(html.contains(r#"<a href="./../womens_team/kim.html">kim</a>"#));
        assert!(!html.contains("womens_team/jane_doe.html"));
        assert!(html.contains(r#"<a href="./../mens_team/john1.html">john</a>"#));
        assert!(html.contains(r#"<a href="./../mens_team/john2.html">john</a>"#));
    }

    #[test]
    fn test_race_rows_keep_parse_order() {
        let html = render_page(&sample_record(), &sample_nav());
        let holly = html.find("Holly Invite").unwrap();
        let regionals = html.find("Regionals").unwrap();
        assert!(holly < regionals);
        let y2022 = html.find("<td>2022</td>").unwrap();
        let y2023 = html.find("<td>2023</td>").unwrap();
        assert!(y2022 < y2023);
    }

    #[test]
    fn test_profile_image_fallback_markup() {
        let html = render_page(&sample_record(), &NavMenus::default());
        assert!(html.contains(r#"src="../images/profiles/9981.jpg""#));
        assert!(html.contains("this.onerror=null;this.src='../images/profiles/default.jpg';"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut record = sample_record();
        record.name = "<script>alert('x')</script>".to_string();
        record.athlete_id = "\"><img src=x>".to_string();
        record.race_results[0].comments = "<b>fast</b>".to_string();
        record.race_results[0].meet_name = "A & B".to_string();
        record.race_results[0].meet_url = "javascript:alert(1)".to_string();

        let html = render_page(&record, &NavMenus::default());
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<img src=x>"));
        assert!(html.contains("&lt;b&gt;fast&lt;/b&gt;"));
        assert!(html.contains(r##"<td><a href="#">A &amp; B</a></td>"##));
    }

    #[test]
    fn test_empty_tables_render_placeholder_rows() {
        let record = AthleteRecord {
            name: "New Runner".to_string(),
            athlete_id: "1".to_string(),
            season_records: Vec::new(),
            race_results: Vec::new(),
        };
        let html = render_page(&record, &NavMenus::default());
        assert!(html.contains("No season records yet"));
        assert!(html.contains("No race results yet"));
        assert_eq!(html.matches("<details>").count(), 2);
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = render_page(&sample_record(), &sample_nav());
        let b = render_page(&sample_record(), &sample_nav());
        assert_eq!(a, b);
    }
}
