// Merged innings-level records (one row per batting innings).

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

use super::{create_parent, csv_error, open, DataError};

/// One batting innings in the merged home/away schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsRecord {
    #[serde(rename = "PlayerName")]
    pub player_name: String,
    #[serde(rename = "Runs")]
    pub runs: u32,
    #[serde(rename = "Minutes")]
    pub minutes: f64,
    #[serde(rename = "BallsFaced")]
    pub balls_faced: f64,
    #[serde(rename = "Fours")]
    pub fours: u32,
    #[serde(rename = "Sixes")]
    pub sixes: u32,
    #[serde(rename = "StrikeRate")]
    pub strike_rate: f64,
    /// Innings of the match (1-4).
    #[serde(rename = "MatchInning")]
    pub match_inning: u8,
    /// Lower-cased opposition name.
    #[serde(rename = "Opposition")]
    pub opposition: String,
    #[serde(rename = "Ground")]
    pub ground: String,
    #[serde(rename = "Year")]
    pub year: i32,
    /// 1 when played in the player's home nation, 0 otherwise.
    #[serde(rename = "Home/Away")]
    pub home_away: u8,
    #[serde(rename = "Nationality")]
    pub nationality: String,
}

impl InningsRecord {
    pub fn is_home(&self) -> bool {
        self.home_away == 1
    }
}

fn read_innings<R: Read>(rdr: R) -> Result<Vec<InningsRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    reader.deserialize().collect()
}

fn write_innings<W: Write>(wtr: W, records: &[InningsRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a merged innings CSV. Any malformed row aborts the load.
pub fn load_merged(path: &Path) -> Result<Vec<InningsRecord>, DataError> {
    let file = open(path)?;
    read_innings(file).map_err(|e| csv_error(path, e))
}

/// Write merged innings to `path`, creating parent directories as needed.
pub fn write_merged(path: &Path, records: &[InningsRecord]) -> Result<(), DataError> {
    create_parent(path)?;
    let file = std::fs::File::create(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_innings(file, records).map_err(|e| csv_error(path, e))
}

/// Serialize merged innings into an in-memory CSV string.
pub fn to_csv_string(records: &[InningsRecord]) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_innings(&mut buf, records)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Parse merged innings from an in-memory CSV string.
pub fn from_csv_str(data: &str) -> Result<Vec<InningsRecord>, csv::Error> {
    read_innings(data.as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
