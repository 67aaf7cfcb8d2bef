// Loosely-typed CSV table used for raw scorecard exports.
//
// Raw exports differ in header spelling and text encoding between sources, so
// they are read as strings first and renamed/coerced by the preprocessing
// stage rather than deserialized straight into a struct.

use std::io::Read;
use std::path::Path;

use super::{csv_error, open, DataError};

/// Text encoding of a raw CSV export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_reader<R: Read>(rdr: R, encoding: Encoding) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
        let headers = reader
            .byte_headers()?
            .iter()
            .map(|field| decode(field, encoding))
            .collect();
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            rows.push(record.iter().map(|field| decode(field, encoding)).collect());
        }
        Ok(RawTable { headers, rows })
    }

    pub fn from_path(path: &Path, encoding: Encoding) -> Result<Self, DataError> {
        let file = open(path)?;
        Self::from_reader(file, encoding).map_err(|e| csv_error(path, e))
    }

    /// Index of the column with exactly this header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like `column`, but a missing column is an error naming `source`.
    pub fn require(&self, name: &str, source: &str) -> Result<usize, DataError> {
        self.column(name).ok_or_else(|| DataError::MissingColumn {
            path: source.to_string(),
            column: name.to_string(),
        })
    }

    /// Remove a column if present.
    pub fn drop_column(&mut self, name: &str) {
        if let Some(idx) = self.column(name) {
            self.headers.remove(idx);
            for row in &mut self.rows {
                if idx < row.len() {
                    row.remove(idx);
                }
            }
        }
    }

    /// Trim headers, replace inner spaces with `_` and lower-case them.
    pub fn normalize_headers(&mut self) {
        for header in &mut self.headers {
            *header = header.trim().replace(' ', "_").to_lowercase();
        }
    }

    /// Rename headers according to `(from, to)` pairs. Unlisted headers are kept.
    pub fn rename(&mut self, pairs: &[(&str, &str)]) {
        for header in &mut self.headers {
            if let Some((_, to)) = pairs.iter().find(|(from, _)| *from == header.as_str()) {
                *header = (*to).to_string();
            }
        }
    }

    /// Cell text for `row` at column `idx`, empty when the row is short.
    pub fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
        row.get(idx).map(|s| s.trim()).unwrap_or("")
    }
}

fn decode(field: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(field).into_owned(),
        Encoding::Latin1 => field.iter().map(|&b| b as char).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_rows() {
        let csv_data = "\
Player,Runs,Mins
JE Root,45,120
JE Root,102*,300";

        let table = RawTable::from_reader(csv_data.as_bytes(), Encoding::Utf8).unwrap();
        assert_eq!(table.headers, vec!["Player", "Runs", "Mins"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][1], "102*");
    }

    #[test]
    fn latin1_bytes_decode_to_matching_code_points() {
        // "Müller" with ü encoded as the single byte 0xFC.
        let mut bytes = b"Player,Runs\n".to_vec();
        bytes.extend_from_slice(&[b'M', 0xFC, b'l', b'l', b'e', b'r']);
        bytes.extend_from_slice(b",10\n");

        let table = RawTable::from_reader(bytes.as_slice(), Encoding::Latin1).unwrap();
        assert_eq!(table.rows[0][0], "Müller");
    }

    #[test]
    fn normalize_and_rename_headers() {
        let csv_data = " Runs ,Home Away,4s\n1,2,3";
        let mut table = RawTable::from_reader(csv_data.as_bytes(), Encoding::Utf8).unwrap();
        table.normalize_headers();
        assert_eq!(table.headers, vec!["runs", "home_away", "4s"]);

        table.rename(&[("runs", "Runs"), ("4s", "Fours")]);
        assert_eq!(table.headers, vec!["Runs", "home_away", "Fours"]);
    }

    #[test]
    fn drop_column_removes_cells() {
        let csv_data = "Unnamed: 0,Runs\n0,45\n1,60";
        let mut table = RawTable::from_reader(csv_data.as_bytes(), Encoding::Utf8).unwrap();
        table.drop_column("Unnamed: 0");
        assert_eq!(table.headers, vec!["Runs"]);
        assert_eq!(table.rows, vec![vec!["45".to_string()], vec!["60".to_string()]]);
    }

    #[test]
    fn short_rows_yield_empty_cells() {
        let csv_data = "A,B,C\n1,2";
        let table = RawTable::from_reader(csv_data.as_bytes(), Encoding::Utf8).unwrap();
        assert_eq!(RawTable::cell(&table.rows[0], 2), "");
        assert!(table.require("D", "test.csv").is_err());
    }
}
