// Career snapshot cleaning: raw aggregate batting tables -> CareerRecord rows.
//
// Two export layouts are supported. The Statsguru layout embeds the country
// in the player name ("SR Tendulkar (INDIA)"); the flat layout has a
// separate country column.

use std::path::Path;

use tracing::{info, warn};

use crate::analysis::round_to;
use crate::config::CareerPaths;
use crate::data::career::{self, CareerRecord};
use crate::data::table::{Encoding, RawTable};
use crate::data::DataError;

/// Column layout of a raw career export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Player, Span, Mat, Inn, NO, Runs, HS, Avg, 100, 50, 0.
    Statsguru,
    /// name, span, matches, innings, not_out, runs, highest_score, average,
    /// century, half_century, ducks, country.
    Flat,
}

impl SnapshotFormat {
    fn renames(self) -> &'static [(&'static str, &'static str)] {
        match self {
            SnapshotFormat::Statsguru => &[
                ("Player", "PlayerName"),
                ("Span", "CareerSpan"),
                ("Mat", "Matches"),
                ("Inn", "Innings"),
                ("NO", "NotOut"),
                ("HS", "HighestScore"),
                ("Avg", "Average"),
                ("100", "Centuries"),
                ("50", "HalfCenturies"),
                ("0", "Ducks"),
            ],
            SnapshotFormat::Flat => &[
                ("name", "PlayerName"),
                ("span", "CareerSpan"),
                ("matches", "Matches"),
                ("innings", "Innings"),
                ("not_out", "NotOut"),
                ("runs", "Runs"),
                ("highest_score", "HighestScore"),
                ("average", "Average"),
                ("century", "Centuries"),
                ("half_century", "HalfCenturies"),
                ("ducks", "Ducks"),
                ("country", "Country"),
            ],
        }
    }
}

/// Raw counting stats of one career, before derived rates are added.
#[derive(Debug, Clone, PartialEq)]
pub struct CareerCounts {
    pub matches: u32,
    pub innings: u32,
    pub not_out: u32,
    pub runs: u32,
    pub highest_score: u32,
    pub average: f64,
    pub centuries: u32,
    pub half_centuries: u32,
    pub ducks: u32,
    pub first_match: i32,
    pub last_match: i32,
}

impl CareerCounts {
    pub fn from_record(record: &CareerRecord) -> Self {
        CareerCounts {
            matches: record.matches,
            innings: record.innings,
            not_out: record.not_out,
            runs: record.runs,
            highest_score: record.highest_score,
            average: record.average,
            centuries: record.centuries,
            half_centuries: record.half_centuries,
            ducks: record.ducks,
            first_match: record.first_match,
            last_match: record.last_match,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived fields
// ---------------------------------------------------------------------------

fn share(part: u32, innings: u32) -> f64 {
    if innings == 0 {
        0.0
    } else {
        round_to(part as f64 / innings as f64, 4)
    }
}

/// Build a full record from counting stats, adding every derived rate.
///
/// `snapshot_year` is the year the table was exported; a player whose last
/// match falls in that year is flagged as current.
pub fn build_record(
    player_name: String,
    country: Option<String>,
    counts: &CareerCounts,
    snapshot_year: i32,
) -> CareerRecord {
    let century_conversion = if counts.centuries > 0 {
        round_to(
            counts.centuries as f64 / (counts.centuries + counts.half_centuries) as f64,
            4,
        )
    } else {
        0.0
    };
    let career_length = match counts.last_match - counts.first_match {
        0 => 1,
        n => n,
    };

    CareerRecord {
        player_name,
        country,
        matches: counts.matches,
        innings: counts.innings,
        not_out: counts.not_out,
        runs: counts.runs,
        highest_score: counts.highest_score,
        average: counts.average,
        centuries: counts.centuries,
        half_centuries: counts.half_centuries,
        ducks: counts.ducks,
        first_match: counts.first_match,
        last_match: counts.last_match,
        century_conversion,
        duck_percentage: share(counts.ducks, counts.innings),
        not_out_percentage: share(counts.not_out, counts.innings),
        fifty_plus_score_percentage: share(
            counts.half_centuries + counts.centuries,
            counts.innings,
        ),
        career_length,
        matches_per_year: round_to(counts.matches as f64 / career_length as f64, 2),
        current_player: u8::from(counts.last_match == snapshot_year),
    }
}

// ---------------------------------------------------------------------------
// Country handling (Statsguru layout)
// ---------------------------------------------------------------------------

/// Split "Name (CODE)" into the name with every parenthesized group removed
/// and the raw code inside the first group. An unclosed `(` is kept as text.
pub fn split_country(raw_name: &str) -> (String, Option<String>) {
    let mut name = String::with_capacity(raw_name.len());
    let mut code = None;
    let mut rest = raw_name;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')').map(|i| open + i) else {
            break;
        };
        name.push_str(&rest[..open]);
        code.get_or_insert_with(|| rest[open + 1..close].to_string());
        rest = &rest[close + 1..];
    }
    name.push_str(rest);
    (name.trim().to_string(), code)
}

/// Normalize a country code. Returns `None` for codes whose rows are dropped
/// (dual nationals and the malformed code "3").
pub fn normalize_country(code: &str) -> Option<String> {
    let trimmed = code.trim();
    let stripped = trimmed
        .strip_prefix("ICC/")
        .or_else(|| trimmed.strip_suffix("/ICC"))
        .unwrap_or(trimmed)
        .trim();
    if stripped.contains('/') || stripped == "3" {
        return None;
    }
    Some(match stripped {
        "INDIA" => "IND".to_string(),
        "BDESH" => "BAN".to_string(),
        other => other.to_string(),
    })
}

/// Parse "YYYY-YYYY" (or a single year) into first and last year.
pub fn parse_span(span: &str) -> Option<(i32, i32)> {
    let mut parts = span.trim().splitn(2, '-');
    let first = parts.next()?.trim().parse().ok()?;
    let last = match parts.next() {
        Some(last) => last.trim().parse().ok()?,
        None => first,
    };
    Some((first, last))
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// Clean a raw career table into records.
///
/// Players who have not batted (innings `-`, runs `-` or `0`) are dropped;
/// a `-` average (never dismissed) becomes the run total.
pub fn clean_snapshot(
    mut table: RawTable,
    format: SnapshotFormat,
    snapshot_year: i32,
    source: &str,
) -> Result<Vec<CareerRecord>, DataError> {
    table.rename(format.renames());

    let name_idx = table.require("PlayerName", source)?;
    let span_idx = table.require("CareerSpan", source)?;
    let matches_idx = table.require("Matches", source)?;
    let innings_idx = table.require("Innings", source)?;
    let not_out_idx = table.require("NotOut", source)?;
    let runs_idx = table.require("Runs", source)?;
    let hs_idx = table.require("HighestScore", source)?;
    let avg_idx = table.require("Average", source)?;
    let hundreds_idx = table.require("Centuries", source)?;
    let fifties_idx = table.require("HalfCenturies", source)?;
    let ducks_idx = table.require("Ducks", source)?;
    let country_idx = match format {
        SnapshotFormat::Flat => Some(table.require("Country", source)?),
        SnapshotFormat::Statsguru => None,
    };

    let mut records = Vec::new();
    for row in &table.rows {
        let cell = move |idx: usize| RawTable::cell(row, idx);
        let raw_name = cell(name_idx);

        if cell(innings_idx) == "-" || matches!(cell(runs_idx), "-" | "0") {
            continue;
        }

        let (player_name, country) = match country_idx {
            Some(idx) => {
                let code = cell(idx);
                let country = (!code.is_empty()).then(|| code.to_string());
                (raw_name.trim().to_string(), country)
            }
            None => match split_country(raw_name) {
                (name, Some(code)) => match normalize_country(&code) {
                    Some(country) => (name, Some(country)),
                    None => continue,
                },
                (name, None) => (name, None),
            },
        };

        let average_cell = match cell(avg_idx) {
            "-" => cell(runs_idx),
            other => other,
        };

        let counts = (|| {
            let (first_match, last_match) = parse_span(cell(span_idx))?;
            Some(CareerCounts {
                matches: cell(matches_idx).parse().ok()?,
                innings: cell(innings_idx).parse().ok()?,
                not_out: cell(not_out_idx).parse().ok()?,
                runs: cell(runs_idx).parse().ok()?,
                highest_score: cell(hs_idx).trim_end_matches('*').parse().ok()?,
                average: average_cell.parse().ok()?,
                centuries: cell(hundreds_idx).parse().ok()?,
                half_centuries: cell(fifties_idx).parse().ok()?,
                ducks: cell(ducks_idx).parse().ok()?,
                first_match,
                last_match,
            })
        })();

        let Some(counts) = counts else {
            warn!("{source}: skipping '{}': unparseable numeric field", player_name);
            continue;
        };

        records.push(build_record(player_name, country, &counts, snapshot_year));
    }

    Ok(records)
}

/// Clean both configured snapshots and write them out.
/// Returns the row counts of the past and latest snapshots.
pub fn clean_snapshot_files(paths: &CareerPaths) -> Result<(usize, usize), DataError> {
    let past = clean_file(
        &paths.past_raw,
        &paths.past_clean,
        SnapshotFormat::Statsguru,
        paths.past_year,
    )?;
    let latest = clean_file(
        &paths.latest_raw,
        &paths.latest_clean,
        SnapshotFormat::Flat,
        paths.latest_year,
    )?;
    Ok((past, latest))
}

fn clean_file(
    raw: &str,
    clean: &str,
    format: SnapshotFormat,
    year: i32,
) -> Result<usize, DataError> {
    let table = RawTable::from_path(Path::new(raw), Encoding::Latin1)?;
    let records = clean_snapshot(table, format, year, raw)?;
    career::write_clean(Path::new(clean), &records)?;
    info!("cleaned {} career rows from {} into {}", records.len(), raw, clean);
    Ok(records.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
