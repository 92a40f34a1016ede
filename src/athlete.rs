//! Athlete CSV parsing
//!
//! Athlete files are positional spreadsheets exported to CSV. Header text is
//! never trusted; only row and column positions carry meaning:
//!
//! ```text
//! row 0        name
//! row 1        athlete id
//! rows 2-4     reserved
//! rows 5..N-2  data rows (season summary or race result)
//! row N-1      footer, discarded
//! ```

use crate::error::RosterError;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// First data row index.
const FIRST_DATA_ROW: usize = 5;
/// Name, id, three reserved rows, one data row and the footer.
const MIN_ROWS: usize = 7;

const COL_PLACE: usize = 1;
const COL_YEAR: usize = 2;
const COL_VALUE: usize = 3;
const COL_MEET: usize = 5;
const COL_URL: usize = 6;
const COL_COMMENTS: usize = 7;

/// One season-summary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRecord {
    pub year: String,
    /// Best mark for the season, may contain SR/PR tokens
    pub value: String,
}

/// One race row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResult {
    pub place: String,
    /// Finish time, may contain SR/PR tokens
    pub time: String,
    pub meet_name: String,
    pub meet_url: String,
    pub comments: String,
}

/// Normalized contents of one athlete CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AthleteRecord {
    pub name: String,
    /// Used to locate the profile image; not validated or guaranteed unique
    pub athlete_id: String,
    pub season_records: Vec<SeasonRecord>,
    pub race_results: Vec<RaceResult>,
}

/// Parser output: the record plus rows worth a second look.
#[derive(Debug, Clone)]
pub struct ParsedAthlete {
    pub record: AthleteRecord,
    /// 1-based CSV lines classified as races with neither a time nor a meet.
    ///
    /// These are rows the empty-year rule put in `race_results` that probably
    /// were not meant as races (a season row with a missing year, a stray
    /// notes row). They are kept, not dropped.
    pub suspect_rows: Vec<u64>,
}

/// Parse an athlete CSV into a record.
pub fn parse_athlete_csv(path: &Path) -> Result<AthleteRecord, RosterError> {
    read_athlete_csv(path).map(|parsed| parsed.record)
}

/// Parse an athlete CSV, keeping the list of suspect race rows.
pub fn read_athlete_csv(path: &Path) -> Result<ParsedAthlete, RosterError> {
    let file = File::open(path).map_err(|source| RosterError::Filesystem {
        path: path.to_path_buf(),
        source,
    })?;
    parse_athlete_reader(file, path)
}

/// Parse athlete CSV data from any reader. `origin` is only used in errors.
pub fn parse_athlete_reader<R: Read>(mut reader: R, origin: &Path) -> Result<ParsedAthlete, RosterError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| match source.kind() {
            io::ErrorKind::InvalidData => RosterError::malformed(origin, "not valid UTF-8 text"),
            _ => RosterError::Filesystem {
                path: origin.to_path_buf(),
                source,
            },
        })?;

    let rows = read_rows(&text).map_err(|source| RosterError::Csv {
        path: origin.to_path_buf(),
        source,
    })?;

    if rows.len() < MIN_ROWS {
        return Err(RosterError::malformed(
            origin,
            format!(
                "expected at least {} rows (name, id, 3 reserved, data, footer), found {}",
                MIN_ROWS,
                rows.len()
            ),
        ));
    }

    let name = required_cell(&rows[0].1, 0, origin, "athlete name")?.to_string();
    let athlete_id = required_cell(&rows[1].1, 0, origin, "athlete id")?.to_string();
    log::debug!("The athlete id for {} is {}", name, athlete_id);

    let mut season_records = Vec::new();
    let mut race_results = Vec::new();
    let mut suspect_rows = Vec::new();

    // Last row is the footer
    for (line, row) in &rows[FIRST_DATA_ROW..rows.len() - 1] {
        let line = *line;
        let year = data_cell(row, COL_YEAR, origin, line, "year")?;

        if !year.is_empty() {
            season_records.push(SeasonRecord {
                year: year.to_string(),
                value: data_cell(row, COL_VALUE, origin, line, "season value")?.to_string(),
            });
        } else {
            let race = RaceResult {
                place: data_cell(row, COL_PLACE, origin, line, "place")?.to_string(),
                time: data_cell(row, COL_VALUE, origin, line, "time")?.to_string(),
                meet_name: data_cell(row, COL_MEET, origin, line, "meet name")?.to_string(),
                meet_url: data_cell(row, COL_URL, origin, line, "meet URL")?.to_string(),
                comments: data_cell(row, COL_COMMENTS, origin, line, "comments")?.to_string(),
            };
            if race.time.trim().is_empty() && race.meet_name.trim().is_empty() {
                log::warn!(
                    "{}: line {} has no year, time or meet; kept as a race row",
                    origin.display(),
                    line
                );
                suspect_rows.push(line);
            }
            race_results.push(race);
        }
    }

    Ok(ParsedAthlete {
        record: AthleteRecord {
            name,
            athlete_id,
            season_records,
            race_results,
        },
        suspect_rows,
    })
}

/// Read every positional row with the 1-based line it starts on.
///
/// The csv reader skips blank lines, but in the athlete format a blank line
/// still takes up a row position, so each skipped line comes back as an empty
/// record. Blank lines after the last record are not rows.
fn read_rows(text: &str) -> Result<Vec<(u64, StringRecord)>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    let mut next_line: u64 = 1;
    loop {
        let start = reader.position().byte() as usize;
        if !reader.read_record(&mut record)? {
            break;
        }
        // Skipped terminators sit between the previous record and this one
        let skipped = text[start..]
            .find(|c: char| c != '\r' && c != '\n')
            .unwrap_or(0);
        let line = 1 + text[..start + skipped].matches('\n').count() as u64;
        while next_line < line {
            rows.push((next_line, StringRecord::new()));
            next_line += 1;
        }
        let embedded: usize = record.iter().map(|field| field.matches('\n').count()).sum();
        next_line = line + 1 + embedded as u64;
        rows.push((line, record.clone()));
    }
    Ok(rows)
}

fn required_cell<'a>(
    row: &'a StringRecord,
    col: usize,
    origin: &Path,
    what: &str,
) -> Result<&'a str, RosterError> {
    row.get(col)
        .ok_or_else(|| RosterError::malformed(origin, format!("missing {} cell", what)))
}

fn data_cell<'a>(
    row: &'a StringRecord,
    col: usize,
    origin: &Path,
    line: u64,
    what: &str,
) -> Result<&'a str, RosterError> {
    row.get(col).ok_or_else(|| {
        RosterError::malformed(
            origin,
            format!("line {}: missing {} (column {})", line, what, col),
        )
    })
}
