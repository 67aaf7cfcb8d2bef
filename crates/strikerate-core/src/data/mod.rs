// Tabular data: raw scorecard tables and the cleaned record schemas.

pub mod career;
pub mod innings;
pub mod table;

use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("missing column `{column}` in {path}")]
    MissingColumn { path: String, column: String },

    #[error("validation error: {0}")]
    Validation(String),
}

pub(crate) fn open(path: &Path) -> Result<std::fs::File, DataError> {
    std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Create the parent directory of an output file if it does not exist yet.
pub(crate) fn create_parent(path: &Path) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DataError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

pub(crate) fn csv_error(path: &Path, source: csv::Error) -> DataError {
    DataError::Csv {
        path: path.display().to_string(),
        source,
    }
}
