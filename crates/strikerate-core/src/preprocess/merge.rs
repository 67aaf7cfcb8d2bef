// Home/away innings merge: raw scorecard exports -> one cleaned table per player.
//
// Raw headers are normalized (trimmed, `_` for spaces, lower-case) and renamed
// to the merged schema. Missing minutes/balls are imputed from innings with
// the same run total, then from the whole table.

use std::cmp::Ordering;
use std::path::Path;

use tracing::{info, warn};

use crate::config::PlayerEntry;
use crate::data::innings::{self, InningsRecord};
use crate::data::table::{Encoding, RawTable};
use crate::data::DataError;

const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("player", "PlayerName"),
    ("runs", "Runs"),
    ("mins", "Minutes"),
    ("bf", "BallsFaced"),
    ("4s", "Fours"),
    ("6s", "Sixes"),
    ("sr", "StrikeRate"),
    ("inns", "MatchInning"),
    ("opposition", "Opposition"),
    ("ground", "Ground"),
    ("year", "Year"),
    ("venue", "Venue"),
    ("home_away", "Home/Away"),
];

/// Innings row before minutes/balls imputation.
#[derive(Debug, Clone)]
struct PendingInnings {
    record: InningsRecord,
    minutes: Option<f64>,
    balls_faced: Option<f64>,
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Parse a count cell. A trailing `*` (not-out marker) is ignored.
pub fn parse_count(cell: &str) -> Option<u32> {
    let value: f64 = cell.trim().trim_end_matches('*').parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value.round() as u32)
    } else {
        None
    }
}

/// Parse a non-negative real cell; placeholders such as `-` yield `None`.
pub fn parse_measure(cell: &str) -> Option<f64> {
    let value: f64 = cell.trim().trim_end_matches('*').parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

// ---------------------------------------------------------------------------
// Imputation
// ---------------------------------------------------------------------------

/// Median of a slice (mean of the two middle values for even lengths).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Fill missing or zero values from innings with an equal run total.
///
/// For each gap: the median of the positive values among rows with the same
/// runs, else the median of all positive values, else 0. Medians are taken
/// over the input values only, so the result does not depend on row order.
pub fn impute_by_runs(runs: &[u32], values: &[Option<f64>]) -> Vec<f64> {
    let positive = |v: &Option<f64>| v.filter(|x| *x > 0.0);

    let global: Vec<f64> = values.iter().filter_map(positive).collect();
    let global_median = median(&global);

    values
        .iter()
        .zip(runs)
        .map(|(value, run)| {
            if let Some(v) = positive(value) {
                return v;
            }
            let similar: Vec<f64> = runs
                .iter()
                .zip(values)
                .filter(|(r, _)| *r == run)
                .filter_map(|(_, v)| positive(v))
                .collect();
            median(&similar).or(global_median).unwrap_or(0.0)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Normalize one side (home or away) of a player's raw export.
fn prepare_side(
    mut table: RawTable,
    home_away: u8,
    player: &PlayerEntry,
    source: &str,
) -> Result<Vec<PendingInnings>, DataError> {
    table.drop_column("Unnamed: 0");
    table.normalize_headers();
    table.rename(COLUMN_RENAMES);

    let runs_idx = table.require("Runs", source)?;
    let inning_idx = table.require("MatchInning", source)?;
    let opposition_idx = table.require("Opposition", source)?;
    let ground_idx = table.require("Ground", source)?;
    let year_idx = table.require("Year", source)?;
    let name_idx = table.column("PlayerName");
    let minutes_idx = table.column("Minutes");
    let balls_idx = table.column("BallsFaced");
    let fours_idx = table.column("Fours");
    let sixes_idx = table.column("Sixes");
    let sr_idx = table.column("StrikeRate");

    let mut rows = Vec::with_capacity(table.rows.len());
    for (line, row) in table.rows.iter().enumerate() {
        let cell = move |idx: usize| RawTable::cell(row, idx);
        let optional = move |idx: Option<usize>| idx.map(|i| RawTable::cell(row, i)).unwrap_or("");

        let Some(runs) = parse_count(cell(runs_idx)) else {
            warn!("{source}: skipping row {} with no runs value '{}'", line + 1, cell(runs_idx));
            continue;
        };
        let match_inning = match cell(inning_idx).parse::<u8>() {
            Ok(n) if (1..=4).contains(&n) => n,
            _ => {
                warn!("{source}: skipping row {} with innings '{}'", line + 1, cell(inning_idx));
                continue;
            }
        };
        let Ok(year) = cell(year_idx).parse::<i32>() else {
            warn!("{source}: skipping row {} with year '{}'", line + 1, cell(year_idx));
            continue;
        };

        let player_name = match optional(name_idx) {
            "" => player.code.clone(),
            name => name.to_string(),
        };

        rows.push(PendingInnings {
            record: InningsRecord {
                player_name,
                runs,
                minutes: 0.0,
                balls_faced: 0.0,
                fours: parse_count(optional(fours_idx)).unwrap_or(0),
                sixes: parse_count(optional(sixes_idx)).unwrap_or(0),
                strike_rate: parse_measure(optional(sr_idx)).unwrap_or(0.0),
                match_inning,
                opposition: cell(opposition_idx).to_lowercase(),
                ground: cell(ground_idx).to_string(),
                year,
                home_away,
                nationality: player.home_nation.clone(),
            },
            minutes: parse_measure(optional(minutes_idx)),
            balls_faced: parse_measure(optional(balls_idx)),
        });
    }
    Ok(rows)
}

/// Merge a player's home and away exports into the cleaned, sorted schema.
pub fn merge_home_away(
    home: RawTable,
    away: RawTable,
    player: &PlayerEntry,
) -> Result<Vec<InningsRecord>, DataError> {
    let mut pending = prepare_side(home, 1, player, &player.home_csv)?;
    pending.extend(prepare_side(away, 0, player, &player.away_csv)?);

    let runs: Vec<u32> = pending.iter().map(|p| p.record.runs).collect();
    let minutes: Vec<Option<f64>> = pending.iter().map(|p| p.minutes).collect();
    let balls: Vec<Option<f64>> = pending.iter().map(|p| p.balls_faced).collect();
    let minutes = impute_by_runs(&runs, &minutes);
    let balls = impute_by_runs(&runs, &balls);

    let mut merged: Vec<InningsRecord> = pending
        .into_iter()
        .zip(minutes.into_iter().zip(balls))
        .map(|(p, (m, b))| InningsRecord {
            minutes: m,
            balls_faced: b,
            ..p.record
        })
        .collect();

    sort_innings(&mut merged);
    Ok(merged)
}

/// Stable sort by year, opposition, venue flag, ground, then match innings.
pub fn sort_innings(rows: &mut [InningsRecord]) {
    rows.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then_with(|| a.opposition.cmp(&b.opposition))
            .then_with(|| a.home_away.cmp(&b.home_away))
            .then_with(|| a.ground.cmp(&b.ground))
            .then_with(|| a.match_inning.cmp(&b.match_inning))
    });
}

/// Read a player's two raw exports, merge them and write the merged CSV.
/// Returns the number of innings written.
pub fn merge_player_files(player: &PlayerEntry) -> Result<usize, DataError> {
    let home = RawTable::from_path(Path::new(&player.home_csv), Encoding::Utf8)?;
    let away = RawTable::from_path(Path::new(&player.away_csv), Encoding::Utf8)?;
    let merged = merge_home_away(home, away, player)?;
    if merged.is_empty() {
        return Err(DataError::Validation(format!(
            "no valid innings found for {}",
            player.name
        )));
    }
    innings::write_merged(Path::new(&player.merged_csv), &merged)?;
    info!(
        "merged {} innings for {} into {}",
        merged.len(),
        player.name,
        player.merged_csv
    );
    Ok(merged.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
