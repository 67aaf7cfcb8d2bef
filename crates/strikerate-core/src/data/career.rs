// Cleaned career-snapshot records (one row per player per snapshot).

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

use super::{create_parent, csv_error, open, DataError};

/// Career batting totals with derived rate fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CareerRecord {
    pub player_name: String,
    pub country: Option<String>,
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
    pub century_conversion: f64,
    pub duck_percentage: f64,
    pub not_out_percentage: f64,
    pub fifty_plus_score_percentage: f64,
    pub career_length: i32,
    pub matches_per_year: f64,
    pub current_player: u8,
}

fn read_career<R: Read>(rdr: R) -> Result<Vec<CareerRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    reader.deserialize().collect()
}

fn write_career<W: Write>(wtr: W, records: &[CareerRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a cleaned career snapshot CSV.
pub fn load_clean(path: &Path) -> Result<Vec<CareerRecord>, DataError> {
    let file = open(path)?;
    read_career(file).map_err(|e| csv_error(path, e))
}

/// Write a cleaned career snapshot CSV, creating parent directories as needed.
pub fn write_clean(path: &Path, records: &[CareerRecord]) -> Result<(), DataError> {
    create_parent(path)?;
    let file = std::fs::File::create(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_career(file, records).map_err(|e| csv_error(path, e))
}

/// Find a player by case-insensitive, whitespace-trimmed name.
pub fn find_player<'a>(records: &'a [CareerRecord], name: &str) -> Option<&'a CareerRecord> {
    let wanted = name.trim().to_lowercase();
    records
        .iter()
        .find(|r| r.player_name.to_lowercase() == wanted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
PlayerName,Country,Matches,Innings,NotOut,Runs,HighestScore,Average,Centuries,HalfCenturies,Ducks,FirstMatch,LastMatch,CenturyConversion,DuckPercentage,NotOutPercentage,FiftyPlusScorePercentage,CareerLength,MatchesPerYear,CurrentPlayer
SR Tendulkar,IND,200,329,33,15921,248,53.78,51,68,14,1989,2013,0.4286,0.0426,0.1003,0.3617,24,8.33,0
Sample Player,,3,4,0,20,12,5.0,0,0,1,2019,2019,0.0,0.25,0.0,0.0,1,3.0,1";

    #[test]
    fn parses_clean_schema_with_optional_country() {
        let rows = read_career(CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country.as_deref(), Some("IND"));
        assert_eq!(rows[0].centuries, 51);
        assert!(rows[1].country.is_none());
        assert_eq!(rows[1].current_player, 1);
    }

    #[test]
    fn find_player_ignores_case_and_padding() {
        let rows = read_career(CSV.as_bytes()).unwrap();
        let found = find_player(&rows, "  sr TENDULKAR ").unwrap();
        assert_eq!(found.runs, 15921);
        assert!(find_player(&rows, "Nobody").is_none());
    }

    #[test]
    fn write_then_read_preserves_header() {
        let rows = read_career(CSV.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_career(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("PlayerName,Country,Matches,Innings,NotOut,Runs"));
        assert_eq!(read_career(text.as_bytes()).unwrap(), rows);
    }
}
