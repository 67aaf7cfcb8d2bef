// JSON persistence of trained models and their label encoders.
//
// Layout under the model directory:
//   <player>_model.json          TrainedModel
//   <player>_label_encoder.json  LabelEncoder

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::evaluation::Evaluation;
use super::forest::RandomForest;
use super::ModelError;

/// A fitted forest together with what it was trained on and how it scored.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedModel {
    pub player: String,
    pub trained_at: DateTime<Utc>,
    /// Feature column names in input order.
    pub features: Vec<String>,
    pub evaluation: Evaluation,
    pub forest: RandomForest,
}

pub fn model_path(model_dir: &Path, player: &str) -> PathBuf {
    model_dir.join(format!("{player}_model.json"))
}

pub fn encoder_path(model_dir: &Path, player: &str) -> PathBuf {
    model_dir.join(format!("{player}_label_encoder.json"))
}

fn io_error(path: &Path, source: std::io::Error) -> ModelError {
    ModelError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Write `value` as pretty JSON, creating the parent directory if needed.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ModelError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| ModelError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    std::fs::write(path, json).map_err(|e| io_error(path, e))
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&text).map_err(|e| ModelError::Json {
        path: path.display().to_string(),
        source: e,
    })
}
